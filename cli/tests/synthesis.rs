use aspect_cli::{
    FlagBinding, Scope, Synthesis, SynthesisError, SynthesisOptions, synthesize_flags,
};
use aspect_flags_core::{DocumentedFlags, FlagDescriptor, FlagKind, Visibility};
use aspect_flags_discovery::{FlagSchemaSource, SchemaDiscovery, StaticSchemaSource};
use clap::error::ErrorKind;
use clap::{Arg, Command};

fn front_end() -> Command {
    Command::new("aspect")
        .subcommand(Command::new("build"))
        .subcommand(Command::new("test"))
        .subcommand(Command::new("clean"))
        .subcommand(Command::new("version"))
}

fn synthesize(descriptors: Vec<FlagDescriptor>) -> (Command, Synthesis) {
    let mut root = front_end();
    let synthesis = synthesize_flags(
        &mut root,
        &StaticSchemaSource::new(descriptors),
        &SynthesisOptions::default(),
    )
    .expect("synthesis should succeed");
    (root, synthesis)
}

fn keep_going() -> FlagDescriptor {
    FlagDescriptor::new("keep_going")
        .with_abbreviation('k')
        .with_negative_flag()
        .with_documentation("Continue as much as possible after an error.")
        .with_commands(["startup", "build"])
}

fn arg<'a>(cmd: &'a Command, id: &str) -> Option<&'a Arg> {
    cmd.get_arguments().find(|a| a.get_id() == id)
}

// ---------------------------------------------------------------------------
// Negatable booleans
// ---------------------------------------------------------------------------

#[test]
fn negatable_flag_registers_both_names_on_root_and_subcommand() {
    let (root, synthesis) = synthesize(vec![keep_going()]);
    let build = root.find_subcommand("build").unwrap();

    for cmd in [&root, build] {
        let plain = arg(cmd, "keep_going").expect("plain face registered");
        let negated = arg(cmd, "nokeep_going").expect("negated face registered");
        assert!(!plain.is_hide_set());
        assert!(!negated.is_hide_set());
        assert_eq!(plain.get_short(), Some('k'));
    }
    assert!(arg(&root, "keep_going").unwrap().is_global_set());
    assert!(!arg(build, "keep_going").unwrap().is_global_set());

    let entry = synthesis.flags.get(&Scope::Root, "keep_going").unwrap();
    assert_eq!(entry.kind(), FlagKind::NegatableBool);
    assert_eq!(entry.negated_name.as_deref(), Some("nokeep_going"));
    assert_eq!(entry.visibility, Visibility::Shown);
}

#[test]
fn negatable_flag_rejects_bad_values_at_parse_time() {
    let (root, _) = synthesize(vec![keep_going()]);

    let err = root
        .clone()
        .try_get_matches_from(["aspect", "build", "--keep_going=bogus"])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidValue);

    let err = root
        .clone()
        .try_get_matches_from(["aspect", "build", "--nokeep_going=false"])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidValue);

    let err = root
        .try_get_matches_from(["aspect", "--nokeep_going=1"])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidValue);
}

#[test]
fn bare_negatable_flag_means_true() {
    let (root, mut synthesis) = synthesize(vec![keep_going()]);
    let matches = root
        .try_get_matches_from(["aspect", "build", "--keep_going"])
        .unwrap();
    synthesis.flags.apply_matches(&matches).unwrap();

    let build = Scope::subcommand("build");
    assert_eq!(synthesis.flags.get_bool(&build, "keep_going"), Some(true));
    assert!(synthesis.flags.get(&build, "keep_going").unwrap().is_changed());
    assert_eq!(synthesis.flags.get_bool(&Scope::Root, "keep_going"), Some(false));
}

#[test]
fn negated_face_clears_the_shared_value() {
    let (root, mut synthesis) = synthesize(vec![keep_going()]);
    let matches = root
        .try_get_matches_from(["aspect", "build", "-k", "--nokeep_going=true"])
        .unwrap();
    synthesis.flags.apply_matches(&matches).unwrap();

    let build = Scope::subcommand("build");
    assert_eq!(synthesis.flags.get_bool(&build, "keep_going"), Some(false));
    assert_eq!(synthesis.flags.forwarded_args(&build), ["--nokeep_going"]);
}

#[test]
fn startup_flag_before_verb_stays_on_root() {
    let (root, mut synthesis) = synthesize(vec![
        FlagDescriptor::new("home_rc")
            .with_negative_flag()
            .with_commands(["startup"]),
    ]);
    let matches = root
        .try_get_matches_from(["aspect", "--nohome_rc", "build"])
        .unwrap();
    synthesis.flags.apply_matches(&matches).unwrap();

    assert_eq!(synthesis.flags.get_bool(&Scope::Root, "home_rc"), Some(false));
    assert_eq!(synthesis.flags.forwarded_args(&Scope::Root), ["--nohome_rc"]);
}

// ---------------------------------------------------------------------------
// Other kinds
// ---------------------------------------------------------------------------

#[test]
fn expando_flag_has_no_negated_companion() {
    let (root, mut synthesis) = synthesize(vec![
        FlagDescriptor::new("expunge_async").with_commands(["clean"]),
        FlagDescriptor::new("remote_download_minimal").with_commands(["build"]),
    ]);
    let clean = root.find_subcommand("clean").unwrap();

    assert!(arg(clean, "expunge_async").is_some());
    assert!(arg(clean, "noexpunge_async").is_none());
    // Documented, so shown, even though expando.
    assert!(!arg(clean, "expunge_async").unwrap().is_hide_set());

    let build = root.find_subcommand("build").unwrap();
    assert!(arg(build, "remote_download_minimal").unwrap().is_hide_set());
    assert!(arg(build, "noremote_download_minimal").is_none());

    let entry = synthesis
        .flags
        .get(&Scope::subcommand("clean"), "expunge_async")
        .unwrap();
    assert!(matches!(entry.binding, FlagBinding::ExpandoBool(_)));
    assert_eq!(
        synthesis.flags.get_bool(&Scope::subcommand("clean"), "expunge_async"),
        Some(false)
    );

    let matches = root
        .try_get_matches_from(["aspect", "clean", "--expunge_async"])
        .unwrap();
    synthesis.flags.apply_matches(&matches).unwrap();
    assert_eq!(
        synthesis.flags.get_bool(&Scope::subcommand("clean"), "expunge_async"),
        Some(true)
    );
}

#[test]
fn negative_form_beats_expando_table() {
    let (root, synthesis) = synthesize(vec![
        FlagDescriptor::new("expunge_async")
            .with_negative_flag()
            .with_commands(["clean"]),
    ]);
    let clean = root.find_subcommand("clean").unwrap();

    assert!(arg(clean, "expunge_async").is_some());
    assert!(arg(clean, "noexpunge_async").is_some());
    let entry = synthesis
        .flags
        .get(&Scope::subcommand("clean"), "expunge_async")
        .unwrap();
    assert_eq!(entry.kind(), FlagKind::NegatableBool);
    assert_eq!(entry.negated_name.as_deref(), Some("noexpunge_async"));
}

#[test]
fn undocumented_startup_expando_is_hidden_bool() {
    let mut root = front_end();
    let options = SynthesisOptions {
        documented: DocumentedFlags::from_names(["keep_going"]),
        ..SynthesisOptions::default()
    };
    let source = StaticSchemaSource::new(vec![
        FlagDescriptor::new("expunge_async").with_commands(["startup"]),
    ]);
    let synthesis = synthesize_flags(&mut root, &source, &options).unwrap();

    let plain = arg(&root, "expunge_async").unwrap();
    assert!(plain.is_hide_set());
    assert!(plain.is_global_set());
    assert!(arg(&root, "noexpunge_async").is_none());
    assert_eq!(synthesis.flags.get_bool(&Scope::Root, "expunge_async"), Some(false));
    assert_eq!(synthesis.schema[0].visibility, Visibility::Hidden);
}

#[test]
fn string_flags_accumulate_or_replace() {
    let (root, mut synthesis) = synthesize(vec![
        FlagDescriptor::new("copt").allow_multiple().with_commands(["build"]),
        FlagDescriptor::new("test_output").with_commands(["test"]),
    ]);

    let matches = root
        .clone()
        .try_get_matches_from(["aspect", "build", "--copt=-O2", "--copt", "-DNDEBUG"])
        .unwrap();
    synthesis.flags.apply_matches(&matches).unwrap();
    assert_eq!(
        synthesis.flags.get_strings(&Scope::subcommand("build"), "copt").unwrap(),
        ["-O2", "-DNDEBUG"]
    );

    let matches = root
        .try_get_matches_from([
            "aspect",
            "test",
            "--test_output=summary",
            "--test_output=errors",
        ])
        .unwrap();
    synthesis.flags.apply_matches(&matches).unwrap();
    assert_eq!(
        synthesis.flags.get_string(&Scope::subcommand("test"), "test_output"),
        Some("errors")
    );
}

// ---------------------------------------------------------------------------
// Discovery outcomes and failures
// ---------------------------------------------------------------------------

#[test]
fn no_workspace_leaves_command_tree_untouched() {
    let mut root = front_end();
    let synthesis = synthesize_flags(
        &mut root,
        &StaticSchemaSource::no_workspace(),
        &SynthesisOptions::default(),
    )
    .unwrap();

    assert!(synthesis.flags.is_empty());
    assert!(synthesis.schema.is_empty());
    assert!(root.get_subcommands().all(|sub| sub.get_arguments().count() == 0));
    assert!(root.get_arguments().next().is_none());
}

#[test]
fn unknown_command_is_skipped_without_error() {
    let (root, synthesis) = synthesize(vec![
        FlagDescriptor::new("incompatible_thing")
            .with_negative_flag()
            .with_commands(["mobile-install", "build"]),
    ]);

    assert_eq!(synthesis.flags.len(), 1);
    assert!(arg(root.find_subcommand("build").unwrap(), "incompatible_thing").is_some());
}

#[test]
fn collision_with_existing_flag_is_reported() {
    let mut root = Command::new("aspect")
        .subcommand(Command::new("build").arg(Arg::new("noisy").long("nokeep_going")));
    let err = synthesize_flags(
        &mut root,
        &StaticSchemaSource::new(vec![keep_going()]),
        &SynthesisOptions::default(),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        SynthesisError::DuplicateFlag { ref command, ref flag } if command == "build" && flag == "nokeep_going"
    ));
}

#[test]
fn duplicate_shorthand_is_reported() {
    let mut root = front_end();
    let err = synthesize_flags(
        &mut root,
        &StaticSchemaSource::new(vec![
            FlagDescriptor::new("jobs").with_abbreviation('j').with_commands(["build"]),
            FlagDescriptor::new("java_debug")
                .with_abbreviation('j')
                .with_commands(["build"]),
        ]),
        &SynthesisOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        SynthesisError::DuplicateShorthand { shorthand: 'j', ref flag, .. } if flag == "java_debug"
    ));
}

struct BrokenBazel;

impl FlagSchemaSource for BrokenBazel {
    fn discover_flag_schema(&self) -> aspect_flags_discovery::Result<SchemaDiscovery> {
        Err(aspect_flags_discovery::DiscoveryError::TimedOut { seconds: 60 })
    }
}

#[test]
fn discovery_failure_aborts_synthesis() {
    let mut root = front_end();
    let err = synthesize_flags(&mut root, &BrokenBazel, &SynthesisOptions::default()).unwrap_err();

    assert!(matches!(err, SynthesisError::SchemaUnavailable(_)));
    assert!(std::error::Error::source(&err).is_some());
}

// ---------------------------------------------------------------------------
// Delegation
// ---------------------------------------------------------------------------

#[test]
fn delegated_commands_pass_unknown_flags_through() {
    let (root, mut synthesis) = synthesize(vec![keep_going()]);
    assert_eq!(synthesis.delegated, ["build"]);

    let matches = root
        .try_get_matches_from([
            "aspect",
            "build",
            "--keep_going",
            "--remote_cache=grpc://cache:9092",
            "//app/...",
        ])
        .unwrap();
    synthesis.flags.apply_matches(&matches).unwrap();

    let (_, build) = matches.subcommand().unwrap();
    let rest: Vec<&String> = build.get_many(aspect_cli::PASSTHROUGH_ARGS).unwrap().collect();
    assert_eq!(rest, ["--remote_cache=grpc://cache:9092", "//app/..."]);
    assert_eq!(
        synthesis.flags.get_bool(&Scope::subcommand("build"), "keep_going"),
        Some(true)
    );
}

#[test]
fn administrative_commands_still_reject_unknown_flags() {
    let (root, synthesis) = synthesize(vec![
        FlagDescriptor::new("announce_rc")
            .with_negative_flag()
            .with_commands(["version", "build"]),
    ]);
    assert_eq!(synthesis.delegated, ["build"]);

    assert!(root
        .clone()
        .try_get_matches_from(["aspect", "version", "--announce_rc"])
        .is_ok());
    let err = root
        .try_get_matches_from(["aspect", "version", "--unknown"])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownArgument);
}
