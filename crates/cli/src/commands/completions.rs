//! Shell completion generation

use clap::CommandFactory;
use clap_complete::Shell;

use super::Cli;
use crate::exit_code::ExitCode;

/// Arguments for the completions command
#[derive(clap::Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Print the completion script for `args.shell` to stdout
pub fn execute(args: CompletionsArgs) -> ExitCode {
    write_completions(args.shell, &mut std::io::stdout());
    ExitCode::Success
}

fn write_completions(shell: Shell, out: &mut dyn std::io::Write) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, out);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(shell: Shell) -> String {
        let mut buf = Vec::new();
        write_completions(shell, &mut buf);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_completions_name_the_binary() {
        for (shell, marker) in [
            (Shell::Bash, "complete"),
            (Shell::Zsh, "compdef"),
            (Shell::Fish, "complete"),
            (Shell::PowerShell, "Register-ArgumentCompleter"),
        ] {
            let script = render(shell);
            assert!(script.contains("fh"), "{shell:?} script lacks binary name");
            assert!(script.contains(marker), "{shell:?} script lacks {marker}");
        }
    }

    #[test]
    fn test_completions_cover_subcommands() {
        let script = render(Shell::Bash);
        for sub in ["upload", "replace", "profile"] {
            assert!(script.contains(sub), "missing {sub}");
        }
    }
}
