mod traits;
pub use traits::*;

mod types;
pub use types::*;

mod naming;
pub use naming::*;

mod pacer;
pub use pacer::*;

mod status;
pub use status::*;

mod submitter;
pub use submitter::*;

mod sequencer;
pub use sequencer::*;
