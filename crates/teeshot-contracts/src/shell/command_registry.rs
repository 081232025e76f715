#[derive(Clone, Copy, Debug)]
pub(crate) struct CommandSpec {
    pub command: &'static str,
    pub usage: &'static str,
    pub summary: &'static str,
}

pub(crate) const SHELL_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: "upload",
        usage: "/upload PATH",
        summary: "load the t-shirt graphic",
    },
    CommandSpec {
        command: "color",
        usage: "/color NAME...",
        summary: "toggle one or more shirt colors",
    },
    CommandSpec {
        command: "all",
        usage: "/all",
        summary: "select every catalog color",
    },
    CommandSpec {
        command: "clear",
        usage: "/clear",
        summary: "deselect every color",
    },
    CommandSpec {
        command: "shot",
        usage: "/shot full|close-up",
        summary: "choose the shot composition",
    },
    CommandSpec {
        command: "size",
        usage: "/size 2048|4096",
        summary: "choose the download resolution",
    },
    CommandSpec {
        command: "generate",
        usage: "/generate",
        summary: "generate one mockup per selected color",
    },
    CommandSpec {
        command: "download",
        usage: "/download [all|collage|original|N]",
        summary: "save resized images to the output directory",
    },
    CommandSpec {
        command: "status",
        usage: "/status",
        summary: "show the current selection and results",
    },
    CommandSpec {
        command: "colors",
        usage: "/colors",
        summary: "list the color catalog",
    },
    CommandSpec {
        command: "help",
        usage: "/help",
        summary: "show this list",
    },
    CommandSpec {
        command: "quit",
        usage: "/quit",
        summary: "leave the shell",
    },
];

/// One line per command, for `/help`.
pub fn shell_help_lines() -> Vec<String> {
    SHELL_COMMANDS
        .iter()
        .map(|spec| format!("{:<38} {}", spec.usage, spec.summary))
        .collect()
}

pub(crate) fn is_known_command(command: &str) -> bool {
    SHELL_COMMANDS.iter().any(|spec| spec.command == command)
}
