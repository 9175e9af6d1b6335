mod box_track;
mod kalman_filter;
mod matching;
mod rect;
mod registry;
mod sort_tracker;

pub use box_track::BoxTrack;
pub use kalman_filter::{KalmanFilter, MatrixError};
pub use matching::{AssignmentResult, Detection, linear_assignment};
pub use rect::{Rect, iou_batch};
pub use registry::{Track, TrackRegistry};
pub use sort_tracker::{SortTracker, TrackerConfig};
