pub mod dtype;
pub mod f16;
pub mod logging;
pub mod tensor;

pub use dtype::TensorType;
pub use f16::{f16_to_f32, f32_to_f16};
pub use logging::{init_file_logger, init_stdout_logger, FileLogger, StdoutLogger};
pub use tensor::{TensorBuffer, TensorError, TensorValue};

// Re-export log so downstream crates share one facade version
pub use log;
