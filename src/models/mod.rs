mod progress;
mod series;
mod session;
mod user;

pub use progress::{NewProgress, ProgressStatus, ProgressUpdate, UserSeriesProgress};
pub use series::{NewSeries, Series, SeriesWithProgress};
pub use session::{NewWatchSession, SessionOutcome, SessionStatus, WatchSession};
pub use user::UserContext;
