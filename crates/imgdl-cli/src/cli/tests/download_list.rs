//! Tests for download, list and completions subcommands.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use clap_complete::Shell;
use std::path::Path;

#[test]
fn cli_parse_download_defaults() {
    match parse(&["imgdl", "download", "https://example.com/gallery"]) {
        CliCommand::Download {
            url,
            dir,
            jobs,
            verify_tls,
            rename_collisions,
            admission_timeout,
        } => {
            assert_eq!(url, "https://example.com/gallery");
            assert_eq!(dir, Path::new("."));
            assert!(jobs.is_none());
            assert!(!verify_tls);
            assert!(!rename_collisions);
            assert!(admission_timeout.is_none());
        }
        _ => panic!("expected Download"),
    }
}

#[test]
fn cli_parse_download_all_flags() {
    match parse(&[
        "imgdl",
        "download",
        "https://example.com/",
        "--dir",
        "/tmp/pics",
        "--jobs",
        "4",
        "--verify-tls",
        "--rename-collisions",
        "--admission-timeout",
        "30",
    ]) {
        CliCommand::Download {
            dir,
            jobs,
            verify_tls,
            rename_collisions,
            admission_timeout,
            ..
        } => {
            assert_eq!(dir, Path::new("/tmp/pics"));
            assert_eq!(jobs, Some(4));
            assert!(verify_tls);
            assert!(rename_collisions);
            assert_eq!(admission_timeout, Some(30));
        }
        _ => panic!("expected Download with flags"),
    }
}

#[test]
fn cli_parse_download_requires_url() {
    assert!(Cli::try_parse_from(["imgdl", "download"]).is_err());
}

#[test]
fn cli_parse_download_rejects_bad_jobs() {
    assert!(Cli::try_parse_from(["imgdl", "download", "https://x/", "--jobs", "many"]).is_err());
}

#[test]
fn cli_parse_list() {
    match parse(&["imgdl", "list", "https://example.com/", "--verify-tls"]) {
        CliCommand::List { url, verify_tls } => {
            assert_eq!(url, "https://example.com/");
            assert!(verify_tls);
        }
        _ => panic!("expected List"),
    }
}

#[test]
fn cli_parse_completions() {
    match parse(&["imgdl", "completions", "bash"]) {
        CliCommand::Completions { shell } => assert_eq!(shell, Shell::Bash),
        _ => panic!("expected Completions"),
    }
    assert!(Cli::try_parse_from(["imgdl", "completions", "cmd.exe"]).is_err());
}

#[test]
fn cli_parse_unknown_subcommand_fails() {
    assert!(Cli::try_parse_from(["imgdl", "crawl", "https://example.com/"]).is_err());
}
