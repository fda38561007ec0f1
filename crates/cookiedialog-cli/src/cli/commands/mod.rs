mod context;
mod decide;
mod dispatch;
mod output;
mod region;
mod start;
mod status;

pub use dispatch::dispatch;
