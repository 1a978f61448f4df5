#[cfg(test)]
mod tests {
    use crate::cli::{Cli, Command, parse_batch_size, parse_condition};
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn test_parse_batch_size() {
        assert_eq!(parse_batch_size("1"), Ok(1));
        assert_eq!(parse_batch_size("250"), Ok(250));
        assert!(parse_batch_size("0").is_err());
        assert!(parse_batch_size("-3").is_err());
        assert!(parse_batch_size("many").is_err());
    }

    #[test]
    fn test_parse_condition() {
        assert_eq!(parse_condition("worker"), Ok("worker".to_string()));
        assert!(parse_condition("").is_err());
        assert!(parse_condition("edge light").is_err());
    }

    #[test]
    fn test_trace_args() {
        let cli = Cli::try_parse_from([
            "tote",
            "trace",
            ".output/server/index.mjs",
            "--out-dir",
            ".output/server",
            "--exclude",
            r"\.map$",
            "--exclude",
            "/test/",
            "--condition",
            "node",
            "--batch-size",
            "20",
            "--no-dynamic-imports",
        ])
        .unwrap();

        let Command::Trace(args) = cli.command else {
            panic!("expected trace command");
        };
        assert_eq!(args.entries, vec![PathBuf::from(".output/server/index.mjs")]);
        assert_eq!(args.out_dir, Some(PathBuf::from(".output/server")));
        assert_eq!(args.exclude, vec![r"\.map$".to_string(), "/test/".to_string()]);
        assert_eq!(args.conditions, vec!["node".to_string()]);
        assert_eq!(args.batch_size, Some(20));
        assert!(args.no_dynamic_imports);
        assert!(args.report.is_none());
    }

    #[test]
    fn test_trace_entries_are_optional() {
        let cli = Cli::try_parse_from(["tote", "trace", "-c", "deploy.json"]).unwrap();
        let Command::Trace(args) = cli.command else {
            panic!("expected trace command");
        };
        assert!(args.entries.is_empty());
        assert_eq!(args.config, Some(PathBuf::from("deploy.json")));
    }

    #[test]
    fn test_trace_rejects_zero_batch_size() {
        assert!(Cli::try_parse_from(["tote", "trace", "a.js", "--batch-size", "0"]).is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["tote", "schema", "--no-color", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(cli.no_color);
        assert!(matches!(cli.command, Command::Schema));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["tote", "-v", "-q", "check"]).is_err());
    }

    #[test]
    fn test_check_args() {
        let cli = Cli::try_parse_from(["tote", "check", "server.js", "--base-dir", "app"]).unwrap();
        let Command::Check(args) = cli.command else {
            panic!("expected check command");
        };
        assert_eq!(args.entries, vec![PathBuf::from("server.js")]);
        assert_eq!(args.base_dir, Some(PathBuf::from("app")));
    }
}
