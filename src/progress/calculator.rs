/// Points contributed by watching every video of a module.
pub const VIDEO_WEIGHT: u32 = 90;

/// Points contributed by passing the module quiz.
pub const QUIZ_WEIGHT: u32 = 10;

/// Completion percentage of a module in `0..=100`.
///
/// Videos are worth up to [`VIDEO_WEIGHT`] points and the quiz a flat
/// [`QUIZ_WEIGHT`], so a user who watched everything but skipped the quiz
/// tops out at 90. The video share is rounded half-up once, after adding the
/// quiz points; since the quiz points are whole, that equals rounding the
/// video share alone.
///
/// A `watched_count` above `total_videos` is clamped. An empty module only
/// counts the quiz.
pub fn compute_progress(total_videos: u32, watched_count: u32, quiz_completed: bool) -> u8 {
    let watched_count = if watched_count > total_videos {
        tracing::warn!(
            "watched count {} exceeds total videos {}, clamping",
            watched_count,
            total_videos
        );
        total_videos
    } else {
        watched_count
    };

    let video_points = if total_videos > 0 {
        // round(watched / total * 90) in integers: floor((2 * 90 * w + t) / (2 * t))
        let (watched, total) = (u64::from(watched_count), u64::from(total_videos));
        (2 * u64::from(VIDEO_WEIGHT) * watched + total) / (2 * total)
    } else {
        0
    };

    let quiz_points = if quiz_completed { QUIZ_WEIGHT } else { 0 };

    // video_points <= 90, so the sum always fits
    (video_points as u32 + quiz_points).min(100) as u8
}
