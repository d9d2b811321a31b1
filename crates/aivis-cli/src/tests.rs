use super::*;

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["aivis-cli", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli =
        Cli::try_parse_from(["aivis-cli", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["aivis-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn analyze_collects_repeated_brands() {
    let cli = Cli::try_parse_from([
        "aivis-cli",
        "analyze",
        "--input",
        "pairs.json",
        "--category",
        "CRM software",
        "--brand",
        "HubSpot",
        "--brand",
        "Salesforce",
        "--save",
    ])
    .unwrap();

    match cli.command {
        Some(Commands::Analyze {
            input,
            category,
            brands,
            csv,
            save,
            ..
        }) => {
            assert_eq!(input, PathBuf::from("pairs.json"));
            assert_eq!(category.as_deref(), Some("CRM software"));
            assert_eq!(brands, vec!["HubSpot".to_string(), "Salesforce".to_string()]);
            assert!(csv.is_none());
            assert!(save);
        }
        other => panic!("expected analyze, got {other:?}"),
    }
}

#[test]
fn analyze_requires_input() {
    assert!(Cli::try_parse_from(["aivis-cli", "analyze"]).is_err());
}

#[test]
fn crawl_parses_site_case_insensitively() {
    let cli = Cli::try_parse_from(["aivis-cli", "crawl", "--site", "Gemini"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Crawl {
            site: SiteProfile::Gemini,
            save: false,
            ..
        })
    ));
}

#[test]
fn crawl_rejects_unknown_site() {
    assert!(Cli::try_parse_from(["aivis-cli", "crawl", "--site", "bard"]).is_err());
}

#[test]
fn crawl_prompt_overrides_are_repeatable() {
    let cli = Cli::try_parse_from([
        "aivis-cli",
        "crawl",
        "--site",
        "chatgpt",
        "--prompt",
        "best crm?",
        "--prompt",
        "cheapest crm?",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Crawl { ref prompts, .. }) if prompts.len() == 2
    ));
}

#[test]
fn reports_list_defaults_limit() {
    let cli = Cli::try_parse_from(["aivis-cli", "reports", "list"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Reports {
            command: ReportsCommands::List { limit: 20 }
        })
    ));
}

#[test]
fn reports_show_requires_uuid() {
    assert!(Cli::try_parse_from(["aivis-cli", "reports", "show", "42"]).is_err());
    let cli = Cli::try_parse_from([
        "aivis-cli",
        "reports",
        "csv",
        "67e55044-10b1-426f-9247-bb680e5fe0c8",
        "--out",
        "out.csv",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Reports {
            command: ReportsCommands::Csv { out: Some(_), .. }
        })
    ));
}
