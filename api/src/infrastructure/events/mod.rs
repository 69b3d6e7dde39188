mod in_process;

pub use in_process::InProcessEventBus;
