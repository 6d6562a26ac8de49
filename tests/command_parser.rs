use stardew_savant::bot::{BotCommand, BundleCommand, CommandParser, ParsedCommand, Usage};

fn parse(line: &str) -> ParsedCommand {
    CommandParser::default().parse(line)
}

#[test]
fn test_plain_chat_is_ignored() {
    match parse("anyone seen a rainbow shell?") {
        ParsedCommand::NotCommand => {}
        other => panic!("Expected NotCommand, got {:?}", other),
    }
    match parse("!") {
        ParsedCommand::NotCommand => {}
        other => panic!("Expected NotCommand for a bare prefix, got {:?}", other),
    }
}

#[test]
fn test_gift_command() {
    match parse("!gift Leah") {
        ParsedCommand::Command(BotCommand::Gift(name)) => assert_eq!(name, "Leah"),
        other => panic!("Expected Gift, got {:?}", other),
    }
}

#[test]
fn test_command_names_ignore_case() {
    match parse("!GIFT leah") {
        ParsedCommand::Command(BotCommand::Gift(name)) => assert_eq!(name, "leah"),
        other => panic!("Expected Gift, got {:?}", other),
    }
}

#[test]
fn test_gift_without_villager_shows_usage() {
    match parse("!gift") {
        ParsedCommand::Usage(Usage::Gift) => {}
        other => panic!("Expected gift usage, got {:?}", other),
    }
}

#[test]
fn test_multi_word_names_join() {
    match parse("!build   Big   Barn") {
        ParsedCommand::Command(BotCommand::Build(name)) => assert_eq!(name, "Big Barn"),
        other => panic!("Expected Build, got {:?}", other),
    }
    match parse("!fish \"Midnight Carp\"") {
        ParsedCommand::Command(BotCommand::Fish(name)) => assert_eq!(name, "Midnight Carp"),
        other => panic!("Expected Fish, got {:?}", other),
    }
}

#[test]
fn test_events_with_and_without_day() {
    match parse("!events spring") {
        ParsedCommand::Command(BotCommand::Events { season, day }) => {
            assert_eq!(season, "spring");
            assert!(day.is_none());
        }
        other => panic!("Expected Events, got {:?}", other),
    }
    match parse("!events Winter 8") {
        ParsedCommand::Command(BotCommand::Events { season, day }) => {
            assert_eq!(season, "Winter");
            assert_eq!(day.as_deref(), Some("8"));
        }
        other => panic!("Expected Events, got {:?}", other),
    }
    match parse("!events") {
        ParsedCommand::Usage(Usage::Events) => {}
        other => panic!("Expected events usage, got {:?}", other),
    }
}

#[test]
fn test_season_arguments_are_lowercased() {
    match parse("!season Spring CROPS Bundle") {
        ParsedCommand::Command(BotCommand::Season { season, args }) => {
            assert_eq!(season, "Spring");
            assert_eq!(args, vec!["crops".to_string(), "bundle".to_string()]);
        }
        other => panic!("Expected Season, got {:?}", other),
    }
}

#[test]
fn test_junimo_and_help() {
    match parse("!junimo") {
        ParsedCommand::Command(BotCommand::Junimo) => {}
        other => panic!("Expected Junimo, got {:?}", other),
    }
    match parse("!junimo HELP") {
        ParsedCommand::Command(BotCommand::JunimoHelp) => {}
        other => panic!("Expected JunimoHelp, got {:?}", other),
    }
}

#[test]
fn test_bundle_check_with_quoted_bundle() {
    match parse("!bundle check \"Artisan Bundle\" Truffle Oil") {
        ParsedCommand::Command(BotCommand::Bundle(BundleCommand::Check { bundle, item })) => {
            assert_eq!(bundle, "Artisan Bundle");
            assert_eq!(item, "Truffle Oil");
        }
        other => panic!("Expected bundle check, got {:?}", other),
    }
}

#[test]
fn test_bundle_uncheck_with_curly_quotes() {
    match parse("!bundle uncheck “Chef's Bundle” “Maple Syrup”") {
        ParsedCommand::Command(BotCommand::Bundle(BundleCommand::Uncheck { bundle, item })) => {
            assert_eq!(bundle, "Chef's Bundle");
            assert_eq!(item, "Maple Syrup");
        }
        other => panic!("Expected bundle uncheck, got {:?}", other),
    }
}

#[test]
fn test_bundle_check_missing_item_shows_usage() {
    match parse("!bundle check \"Artisan Bundle\"") {
        ParsedCommand::Usage(Usage::BundleCheck) => {}
        other => panic!("Expected check usage, got {:?}", other),
    }
    match parse("!bundle uncheck") {
        ParsedCommand::Usage(Usage::BundleUncheck) => {}
        other => panic!("Expected uncheck usage, got {:?}", other),
    }
}

#[test]
fn test_bundle_reset_defaults_to_all() {
    match parse("!bundle reset") {
        ParsedCommand::Command(BotCommand::Bundle(BundleCommand::Reset { scope })) => {
            assert_eq!(scope, "all")
        }
        other => panic!("Expected bundle reset, got {:?}", other),
    }
    match parse("!bundle reset pantry") {
        ParsedCommand::Command(BotCommand::Bundle(BundleCommand::Reset { scope })) => {
            assert_eq!(scope, "pantry")
        }
        other => panic!("Expected bundle reset, got {:?}", other),
    }
}

#[test]
fn test_bundle_subcommands() {
    match parse("!bundle find maple syrup") {
        ParsedCommand::Command(BotCommand::Bundle(BundleCommand::Find(item))) => {
            assert_eq!(item, "maple syrup")
        }
        other => panic!("Expected bundle find, got {:?}", other),
    }
    match parse("!bundle find") {
        ParsedCommand::Usage(Usage::BundleFind) => {}
        other => panic!("Expected find usage, got {:?}", other),
    }
    match parse("!bundle status Crafts Room") {
        ParsedCommand::Command(BotCommand::Bundle(BundleCommand::Status(target))) => {
            assert_eq!(target, "Crafts Room")
        }
        other => panic!("Expected bundle status, got {:?}", other),
    }
    match parse("!bundle incomplete") {
        ParsedCommand::Command(BotCommand::Bundle(BundleCommand::Incomplete)) => {}
        other => panic!("Expected bundle incomplete, got {:?}", other),
    }
}

#[test]
fn test_bundle_free_text_is_a_query() {
    match parse("!bundle") {
        ParsedCommand::Command(BotCommand::Bundle(BundleCommand::Query(q))) => assert!(q.is_empty()),
        other => panic!("Expected overview query, got {:?}", other),
    }
    match parse("!bundle Spring Crops Bundle") {
        ParsedCommand::Command(BotCommand::Bundle(BundleCommand::Query(q))) => {
            assert_eq!(q, "Spring Crops Bundle")
        }
        other => panic!("Expected bundle query, got {:?}", other),
    }
}

#[test]
fn test_unknown_command_keeps_its_name() {
    match parse("!harvest moon") {
        ParsedCommand::Unknown(name) => assert_eq!(name, "harvest"),
        other => panic!("Expected Unknown, got {:?}", other),
    }
}

#[test]
fn test_custom_prefix() {
    let parser = CommandParser::new('^');
    assert_eq!(parser.prefix(), '^');
    match parser.parse("^crop Blueberry") {
        ParsedCommand::Command(BotCommand::Crop(name)) => assert_eq!(name, "Blueberry"),
        other => panic!("Expected Crop, got {:?}", other),
    }
    match parser.parse("!crop Blueberry") {
        ParsedCommand::NotCommand => {}
        other => panic!("Expected NotCommand for the wrong prefix, got {:?}", other),
    }
}
