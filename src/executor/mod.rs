pub mod input;
pub mod shell;

pub use input::{InputDriver, InputSynthesizer, ShellOutput};
pub use shell::{CommandOutput, CommandRunner, ShellRunner};
