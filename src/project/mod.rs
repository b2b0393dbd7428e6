mod framenum;
mod framespan;
mod rational;
mod video_spec;

pub use framenum::*;
pub use framespan::*;
pub use rational::*;
pub use video_spec::*;
