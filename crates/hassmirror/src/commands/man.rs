//! `hassmirror man`: render roff man pages from the clap definition.

use std::io::Write;

use clap::CommandFactory;

use crate::cli::{Cli, ManArgs};
use crate::error::CliError;

pub fn handle(args: &ManArgs) -> Result<(), CliError> {
    let page = render(args.command.as_deref())?;
    std::io::stdout().write_all(&page)?;
    Ok(())
}

/// Render the page for `subcommand`, or the top-level page when `None`.
fn render(subcommand: Option<&str>) -> Result<Vec<u8>, CliError> {
    let root = Cli::command();
    let cmd = match subcommand {
        None => root,
        Some(name) => {
            let sub = root
                .find_subcommand(name)
                .filter(|s| !s.is_hide_set())
                .ok_or_else(|| CliError::Validation {
                    field: "command".into(),
                    reason: format!("no subcommand named '{name}'"),
                })?;
            sub.clone().name(format!("hassmirror-{}", sub.get_name()))
        }
    };

    let mut buf = Vec::new();
    clap_mangen::Man::new(cmd).render(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn top_level_page_names_the_binary() {
        let page = String::from_utf8(render(None).unwrap()).unwrap();
        assert!(page.contains(".TH"), "{page}");
        assert!(page.contains("hassmirror"));
        assert!(page.contains("watch"));
    }

    #[test]
    fn subcommand_page_documents_only_that_command() {
        let page = String::from_utf8(render(Some("watch")).unwrap()).unwrap();
        assert!(page.contains("print sensor readings as they change"), "{page}");
        assert!(!page.contains("Generate shell completions"));
    }

    #[test]
    fn unknown_subcommand_is_a_usage_error() {
        let err = render(Some("nope")).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::exit_code::USAGE);
    }
}
