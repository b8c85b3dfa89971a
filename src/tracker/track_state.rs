/// Lifecycle state of a track.
///
/// New tracks are `Tentative` until enough consecutive matches confirm them.
/// `Deleted` is terminal; such tracks are dropped at the end of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackState {
    #[default]
    Tentative,
    Confirmed,
    Deleted,
}
