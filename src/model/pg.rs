use chrono::{DateTime, Utc};
use sqlx::prelude::FromRow;

use crate::model::entity::{
    Category, Module, ProfilePatch, ProgressPatch, Quiz, UserLastOpened, UserModuleProgress,
    UserProfile, Video,
};
use crate::model::{DbConnection, DocumentStore, StoreError, StoreResult};

/// [`DocumentStore`] backed by PostgreSQL, see `migrations/` for the schema.
#[derive(Debug, Clone)]
pub struct PgStore {
    database: DbConnection,
}

impl PgStore {
    pub fn new(conn: DbConnection) -> Self {
        Self { database: conn }
    }

    pub fn connection(&self) -> &DbConnection {
        &self.database
    }

    fn executor(&self) -> &sqlx::PgPool {
        self.database.pool()
    }
}

#[derive(FromRow)]
struct ModuleWithVideosRow {
    id: String,
    title: String,
    description: String,
    category: String,
    users: i32,
    total_videos: Option<i32>,
    videos: serde_json::Value,
}

impl TryFrom<ModuleWithVideosRow> for Module {
    type Error = StoreError;

    fn try_from(row: ModuleWithVideosRow) -> StoreResult<Self> {
        let videos: Vec<Video> = serde_json::from_value(row.videos)?;
        let users = u32::try_from(row.users)
            .map_err(|_| StoreError::Corrupt(format!("module {}: users = {}", row.id, row.users)))?;

        let module = Module::new(
            row.id,
            row.title,
            row.description,
            Category::from(row.category),
            videos,
            users,
        );

        Ok(match row.total_videos.map(u32::try_from) {
            Some(Ok(total)) => module.with_declared_total_videos(total),
            _ => module,
        })
    }
}

#[derive(FromRow)]
struct ProgressRow {
    watched_videos: Vec<i32>,
    quiz_completed: bool,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProgressRow> for UserModuleProgress {
    type Error = StoreError;

    fn try_from(row: ProgressRow) -> StoreResult<Self> {
        let watched = row
            .watched_videos
            .into_iter()
            .map(|id| {
                u32::try_from(id).map_err(|_| StoreError::Corrupt(format!("video id {id}")))
            })
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(UserModuleProgress::new(watched, row.quiz_completed).with_updated_at(row.updated_at))
    }
}

#[derive(FromRow)]
struct QuizRow {
    question: String,
    options: Vec<String>,
    correct_answer_index: i32,
}

#[derive(FromRow)]
struct ProfileRow {
    user_id: String,
    display_name: Option<String>,
    email: Option<String>,
    photo_url: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ProfileRow> for UserProfile {
    fn from(row: ProfileRow) -> Self {
        UserProfile::new(row.user_id, row.display_name, row.email, row.photo_url)
            .with_created_at(row.created_at)
    }
}

const MODULES_WITH_VIDEOS: &str = r#"
    SELECT
        m.id,
        m.title,
        m.description,
        m.category,
        m.users,
        m.total_videos,
        COALESCE(
            json_agg(
                json_build_object(
                    'id', v.id,
                    'title', v.title,
                    'description', v.description,
                    'url', v.url,
                    'duration', v.duration
                ) ORDER BY v.position
            ) FILTER (WHERE v.id IS NOT NULL),
            '[]'
        ) AS videos
    FROM modules m
    LEFT JOIN videos v ON v.module_id = m.id
"#;

fn to_i32<T>(value: T, what: &str) -> StoreResult<i32>
where
    T: Copy + std::fmt::Display + TryInto<i32>,
{
    value
        .try_into()
        .map_err(|_| StoreError::Corrupt(format!("{what} out of range: {value}")))
}

#[async_trait::async_trait]
impl DocumentStore for PgStore {
    async fn list_modules(&self) -> StoreResult<Vec<Module>> {
        let query = format!("{MODULES_WITH_VIDEOS} GROUP BY m.id ORDER BY m.order_index");
        let rows: Vec<ModuleWithVideosRow> = sqlx::query_as(&query)
            .fetch_all(self.executor())
            .await?;

        rows.into_iter().map(Module::try_from).collect()
    }

    async fn get_module(&self, module_id: &str) -> StoreResult<Option<Module>> {
        let query = format!("{MODULES_WITH_VIDEOS} WHERE m.id = $1 GROUP BY m.id");
        let row: Option<ModuleWithVideosRow> = sqlx::query_as(&query)
            .bind(module_id)
            .fetch_optional(self.executor())
            .await?;

        row.map(Module::try_from).transpose()
    }

    async fn get_user_module_progress(
        &self,
        user_id: &str,
        module_id: &str,
    ) -> StoreResult<Option<UserModuleProgress>> {
        let row: Option<ProgressRow> = sqlx::query_as(
            "SELECT watched_videos, quiz_completed, updated_at FROM user_module_progress WHERE user_id = $1 AND module_id = $2",
        )
        .bind(user_id)
        .bind(module_id)
        .fetch_optional(self.executor())
        .await?;

        row.map(UserModuleProgress::try_from).transpose()
    }

    async fn set_user_module_progress(
        &self,
        user_id: &str,
        module_id: &str,
        patch: ProgressPatch,
    ) -> StoreResult<UserModuleProgress> {
        let video = patch
            .watched_video()
            .map(|id| to_i32(id, "video id"))
            .transpose()?;

        // merge happens in one statement, concurrent patches cannot lose ids
        let row: ProgressRow = sqlx::query_as(
            r#"
            INSERT INTO user_module_progress (user_id, module_id, watched_videos, quiz_completed)
            VALUES (
                $1,
                $2,
                CASE WHEN $3::INTEGER IS NULL THEN '{}'::INTEGER[] ELSE ARRAY[$3::INTEGER] END,
                $4
            )
            ON CONFLICT (user_id, module_id) DO UPDATE SET
                watched_videos = CASE
                    WHEN $3::INTEGER IS NULL OR $3::INTEGER = ANY(user_module_progress.watched_videos)
                        THEN user_module_progress.watched_videos
                    ELSE array_append(user_module_progress.watched_videos, $3::INTEGER)
                END,
                quiz_completed = user_module_progress.quiz_completed OR EXCLUDED.quiz_completed,
                updated_at = now()
            RETURNING watched_videos, quiz_completed, updated_at
            "#,
        )
        .bind(user_id)
        .bind(module_id)
        .bind(video)
        .bind(patch.completes_quiz())
        .fetch_one(self.executor())
        .await?;

        UserModuleProgress::try_from(row)
    }

    async fn get_last_opened_module(&self, user_id: &str) -> StoreResult<Option<UserLastOpened>> {
        let row: Option<(String, DateTime<Utc>)> = sqlx::query_as(
            "SELECT module_id, opened_at FROM user_last_opened WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(self.executor())
        .await?;

        Ok(row.map(|(module_id, opened_at)| UserLastOpened::new(module_id, Some(opened_at))))
    }

    async fn set_last_opened_module(&self, user_id: &str, module_id: &str) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_last_opened (user_id, module_id, opened_at) VALUES ($1, $2, now())
            ON CONFLICT (user_id) DO UPDATE SET module_id = EXCLUDED.module_id, opened_at = now()
            "#,
        )
        .bind(user_id)
        .bind(module_id)
        .execute(self.executor())
        .await?;
        Ok(())
    }

    async fn get_quiz(&self, module_id: &str) -> StoreResult<Option<Quiz>> {
        let row: Option<QuizRow> = sqlx::query_as(
            "SELECT question, options, correct_answer_index FROM quizzes WHERE module_id = $1",
        )
        .bind(module_id)
        .fetch_optional(self.executor())
        .await?;

        row.map(|row| -> StoreResult<Quiz> {
            let index = usize::try_from(row.correct_answer_index).map_err(|_| {
                StoreError::Corrupt(format!("quiz {module_id}: answer index {}", row.correct_answer_index))
            })?;
            Ok(Quiz::new(row.question, row.options, index))
        })
        .transpose()
    }

    async fn put_module(&self, module: &Module) -> StoreResult<()> {
        let mut tx = self.executor().begin().await?;

        sqlx::query(
            r#"
            INSERT INTO modules (id, title, description, category, users, total_videos)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                category = EXCLUDED.category,
                users = EXCLUDED.users,
                total_videos = EXCLUDED.total_videos
            "#,
        )
        .bind(module.id())
        .bind(module.title())
        .bind(module.description())
        .bind(module.category().as_str())
        .bind(to_i32(module.users(), "users")?)
        .bind(to_i32(module.total_videos(), "total videos")?)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM videos WHERE module_id = $1")
            .bind(module.id())
            .execute(&mut *tx)
            .await?;

        for (position, video) in module.videos().iter().enumerate() {
            sqlx::query(
                "INSERT INTO videos (module_id, id, position, title, description, url, duration) VALUES ($1,$2,$3,$4,$5,$6,$7)",
            )
            .bind(module.id())
            .bind(to_i32(video.id(), "video id")?)
            .bind(to_i32(position, "video position")?)
            .bind(video.title())
            .bind(video.description())
            .bind(video.url())
            .bind(video.duration())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn put_quiz(&self, module_id: &str, quiz: &Quiz) -> StoreResult<()> {
        let index = i32::try_from(quiz.correct_answer_index())
            .map_err(|_| StoreError::Corrupt(format!("quiz {module_id}: answer index too large")))?;

        sqlx::query(
            r#"
            INSERT INTO quizzes (module_id, question, options, correct_answer_index)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (module_id) DO UPDATE SET
                question = EXCLUDED.question,
                options = EXCLUDED.options,
                correct_answer_index = EXCLUDED.correct_answer_index
            "#,
        )
        .bind(module_id)
        .bind(quiz.question())
        .bind(quiz.options())
        .bind(index)
        .execute(self.executor())
        .await?;
        Ok(())
    }

    async fn get_user_profile(&self, user_id: &str) -> StoreResult<Option<UserProfile>> {
        let row: Option<ProfileRow> = sqlx::query_as(
            "SELECT user_id, display_name, email, photo_url, created_at FROM user_profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(self.executor())
        .await?;

        Ok(row.map(UserProfile::from))
    }

    async fn upsert_user_profile(
        &self,
        user_id: &str,
        patch: ProfilePatch,
    ) -> StoreResult<UserProfile> {
        let row: ProfileRow = sqlx::query_as(
            r#"
            INSERT INTO user_profiles (user_id, display_name, email, photo_url)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE SET
                display_name = COALESCE(EXCLUDED.display_name, user_profiles.display_name),
                email = COALESCE(EXCLUDED.email, user_profiles.email),
                photo_url = COALESCE(EXCLUDED.photo_url, user_profiles.photo_url)
            RETURNING user_id, display_name, email, photo_url, created_at
            "#,
        )
        .bind(user_id)
        .bind(patch.new_display_name())
        .bind(patch.new_email())
        .bind(patch.new_photo_url())
        .fetch_one(self.executor())
        .await?;

        Ok(UserProfile::from(row))
    }
}
