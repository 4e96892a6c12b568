use super::*;

fn parse(args: &[&str]) -> CliCommand {
    let cli = Cli::try_parse_from(args).unwrap();
    cli.command
}

#[test]
fn cli_parse_add_defaults_to_video() {
    match parse(&["mdq", "add", "https://example.com/watch?v=1"]) {
        CliCommand::Add { urls, format, quality, dest } => {
            assert_eq!(urls, vec!["https://example.com/watch?v=1"]);
            assert_eq!(format, FormatArg::Video);
            assert!(quality.is_none());
            assert!(dest.is_none());
        }
        _ => panic!("expected Add"),
    }
}

#[test]
fn cli_parse_add_audio_with_dest() {
    match parse(&[
        "mdq", "add", "https://a.test/1", "https://a.test/2", "--format", "audio", "--dest",
        "/tmp/dl",
    ]) {
        CliCommand::Add { urls, format, dest, .. } => {
            assert_eq!(urls.len(), 2);
            assert_eq!(format, FormatArg::Audio);
            assert_eq!(dest.as_deref(), Some("/tmp/dl"));
        }
        _ => panic!("expected Add"),
    }
}

#[test]
fn cli_parse_add_quality() {
    match parse(&["mdq", "add", "https://a.test/1", "--quality", "1080"]) {
        CliCommand::Add { quality, .. } => assert_eq!(quality.as_deref(), Some("1080")),
        _ => panic!("expected Add"),
    }
}

#[test]
fn cli_parse_add_requires_url() {
    assert!(Cli::try_parse_from(["mdq", "add"]).is_err());
}

#[test]
fn cli_parse_run() {
    match parse(&["mdq", "run"]) {
        CliCommand::Run => {}
        _ => panic!("expected Run"),
    }
}

#[test]
fn cli_parse_status() {
    match parse(&["mdq", "status"]) {
        CliCommand::Status => {}
        _ => panic!("expected Status"),
    }
}

#[test]
fn cli_parse_cancel() {
    match parse(&["mdq", "cancel", "42"]) {
        CliCommand::Cancel { id } => assert_eq!(id, 42),
        _ => panic!("expected Cancel"),
    }
}

#[test]
fn cli_cancel_help_mentions_run_process() {
    use clap::CommandFactory;
    let cmd = Cli::command();
    let cancel = cmd.find_subcommand("cancel").expect("cancel subcommand");
    let help = cancel.get_long_about().expect("long about").to_string();
    assert!(help.contains("mdq run"));
}

#[test]
fn cli_parse_retry() {
    match parse(&["mdq", "retry", "7"]) {
        CliCommand::Retry { id } => assert_eq!(id, 7),
        _ => panic!("expected Retry"),
    }
}

#[test]
fn cli_parse_clear() {
    match parse(&["mdq", "clear"]) {
        CliCommand::Clear => {}
        _ => panic!("expected Clear"),
    }
}

#[test]
fn cli_parse_folder_show() {
    match parse(&["mdq", "folder"]) {
        CliCommand::Folder { path } => assert!(path.is_none()),
        _ => panic!("expected Folder"),
    }
}

#[test]
fn cli_parse_folder_set() {
    match parse(&["mdq", "folder", "/home/me/Downloads"]) {
        CliCommand::Folder { path } => assert_eq!(path.as_deref(), Some("/home/me/Downloads")),
        _ => panic!("expected Folder"),
    }
}
