mod category;
pub use category::{Category, CategoryFilter};

mod video;
pub use video::{Video, VideoId};

mod module;
pub use module::Module;

mod user_progress;
pub use user_progress::{ProgressPatch, UserLastOpened, UserModuleProgress};

mod user_profile;
pub use user_profile::{ProfilePatch, UserProfile};

mod quiz;
pub use quiz::Quiz;

mod catalog;
pub use catalog::{Catalog, CatalogEntry};
