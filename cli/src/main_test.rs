use super::*;

#[test]
fn token_file_prefers_explicit_path() {
    let path = token_file(Some(PathBuf::from("/tmp/t")), Some(PathBuf::from("/home/ada"))).unwrap();
    assert_eq!(path, PathBuf::from("/tmp/t"));
}

#[test]
fn token_file_defaults_under_home() {
    let path = token_file(None, Some(PathBuf::from("/home/ada"))).unwrap();
    assert_eq!(path, PathBuf::from("/home/ada/.meetscribe/tokens"));
}

#[test]
fn token_file_without_home_is_an_error() {
    assert!(matches!(token_file(None, None), Err(CliError::NoTokenFile)));
}

#[test]
fn guard_line_formats_decisions() {
    assert_eq!(guard_line("/", GuardDecision::Allow), "allow /");
    assert_eq!(guard_line("/meetings", GuardDecision::Redirect("/auth/login")), "redirect /meetings -> /auth/login");
}

#[test]
fn fulltext_args_collect_filters() {
    let cli = Cli::try_parse_from([
        "meetscribe",
        "--token-file",
        "/tmp/t",
        "search",
        "fulltext",
        "budget",
        "--meeting-id",
        "m1",
        "--meeting-id",
        "m2",
        "--from",
        "2026-01-01",
    ])
    .unwrap();

    let Command::Search(SearchCommand { command: SearchSubcommand::Fulltext { query, limit, offset, filters } }) = cli.command
    else {
        panic!("expected search fulltext");
    };
    assert_eq!(query, "budget");
    assert_eq!((limit, offset), (DEFAULT_LIMIT, 0));
    let filters = SearchFilters::from(filters);
    assert_eq!(filters.meeting_ids, ["m1", "m2"]);
    assert_eq!(filters.date_from.as_deref(), Some("2026-01-01"));
}

fn store_error() -> StoreError {
    StoreError::Io { path: PathBuf::from("/blocked/tokens"), source: std::io::Error::other("not a directory") }
}

#[test]
fn finish_reports_unsaved_session_after_success() {
    assert!(matches!(finish(Ok(()), Err(store_error())), Err(CliError::Store(_))));
}

#[test]
fn finish_prefers_command_error() {
    assert!(matches!(finish(Err(CliError::NotSignedIn), Err(store_error())), Err(CliError::NotSignedIn)));
    assert!(finish(Ok(()), Ok(())).is_ok());
}

#[test]
fn guard_accepts_show_cookie_flag() {
    let cli = Cli::try_parse_from(["meetscribe", "guard", "/meetings", "--show-cookie"]).unwrap();
    assert!(matches!(cli.command, Command::Guard { show_cookie: true, .. }));
}
