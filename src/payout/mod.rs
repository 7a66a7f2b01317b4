pub mod orchestrator;
pub mod pix;
