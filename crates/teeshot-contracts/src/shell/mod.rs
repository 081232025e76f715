mod command_parser;
mod command_registry;

pub use command_parser::{parse_command, DownloadTarget, ShellCommand};
pub use command_registry::shell_help_lines;
