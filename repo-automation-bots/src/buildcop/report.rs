//! Test report parsing.
//!
//! Reports arrive either as base64-encoded xUnit XML or as a bare
//! `testsFailed` flag. Both are normalized into [`TestResult`]s.

use super::error::ParseError;
use super::identity::TestIdentity;
use super::result::{BuildInfo, Outcome, TestResult};
use crate::events::BuildResultPayload;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashSet;
use tracing::debug;

/// Suite names that carry no package information.
const GENERIC_SUITE_NAMES: &[&str] = &["pytest", "Mocha Tests"];

/// Decides which package name a test case is filed under.
#[derive(Debug, Clone, Default)]
pub struct PackageNaming {
    prefixes: Vec<String>,
}

impl PackageNaming {
    /// Trims any of `prefixes` from package names.
    #[must_use]
    pub fn new(prefixes: Vec<String>) -> Self {
        Self { prefixes }
    }

    /// Uses the suite name unless it is absent or generic, in which case the
    /// case's class name is used.
    fn package(&self, suite: Option<&str>, classname: Option<&str>) -> Option<String> {
        let raw = match suite {
            Some(name) if !name.is_empty() && !GENERIC_SUITE_NAMES.contains(&name) => Some(name),
            _ => classname.filter(|c| !c.is_empty()),
        }?;

        let trimmed = self
            .prefixes
            .iter()
            .find_map(|prefix| raw.strip_prefix(prefix.as_str()))
            .unwrap_or(raw);
        Some(trimmed.to_string())
    }
}

/// Parses the report carried by a build result payload.
///
/// # Errors
///
/// Returns [`ParseError`] if the payload has no report or the report is
/// malformed.
pub fn parse_payload(
    payload: &BuildResultPayload,
    naming: &PackageNaming,
) -> Result<Vec<TestResult>, ParseError> {
    let build = BuildInfo::new(payload.commit.as_deref(), payload.build_url.as_deref());

    if let Some(encoded) = &payload.xunit_xml {
        let decoded = STANDARD.decode(encoded.trim())?;
        let xml = String::from_utf8(decoded)?;
        return parse_xunit(&xml, &build, naming);
    }

    match payload.tests_failed {
        Some(failed) => Ok(vec![TestResult {
            identity: TestIdentity::build(),
            outcome: if failed {
                Outcome::Failed
            } else {
                Outcome::Passed
            },
            failure_message: None,
            build,
        }]),
        None => Err(ParseError::MissingReport),
    }
}

/// Test case being read.
#[derive(Debug, Default)]
struct PendingCase {
    name: String,
    classname: Option<String>,
    suite: Option<String>,
    skipped: bool,
    failed: bool,
    message: Option<String>,
    text: String,
    in_failure: bool,
}

/// Parses an xUnit XML report.
///
/// Skipped cases are dropped. Go subtests are folded into their parent when
/// the parent reports the same outcome, and duplicate identities collapse.
///
/// # Errors
///
/// Returns [`ParseError`] for empty, truncated, or malformed documents.
pub fn parse_xunit(
    xml: &str,
    build: &BuildInfo,
    naming: &PackageNaming,
) -> Result<Vec<TestResult>, ParseError> {
    if xml.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut results = Vec::new();
    let mut suites: Vec<Option<String>> = Vec::new();
    let mut current: Option<PendingCase> = None;
    let mut depth = 0usize;
    let mut seen_root = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                check_root(&e, &mut seen_root)?;
                depth += 1;
                match e.local_name().as_ref() {
                    b"testsuite" => suites.push(attribute(&e, "name")?),
                    b"testcase" => current = Some(start_case(&e, &suites)?),
                    b"skipped" => mark_skipped(current.as_mut()),
                    b"failure" | b"error" => {
                        if let Some(case) = current.as_mut() {
                            case.failed = true;
                            case.message = attribute(&e, "message")?;
                            case.in_failure = true;
                        }
                    }
                    _ => {}
                }
            }
            Event::Empty(e) => {
                check_root(&e, &mut seen_root)?;
                match e.local_name().as_ref() {
                    b"testcase" => {
                        let case = start_case(&e, &suites)?;
                        push_case(&mut results, case, build, naming);
                    }
                    b"skipped" => mark_skipped(current.as_mut()),
                    b"failure" | b"error" => {
                        if let Some(case) = current.as_mut() {
                            case.failed = true;
                            case.message = attribute(&e, "message")?;
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(t) => {
                if let Some(case) = current.as_mut().filter(|c| c.in_failure) {
                    case.text.push_str(&t.unescape()?);
                }
            }
            Event::CData(t) => {
                if let Some(case) = current.as_mut().filter(|c| c.in_failure) {
                    case.text.push_str(&String::from_utf8_lossy(&t));
                }
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                match e.local_name().as_ref() {
                    b"testsuite" => {
                        suites.pop();
                    }
                    b"testcase" => {
                        if let Some(case) = current.take() {
                            push_case(&mut results, case, build, naming);
                        }
                    }
                    b"failure" | b"error" => {
                        if let Some(case) = current.as_mut() {
                            case.in_failure = false;
                        }
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(ParseError::Empty);
    }
    if depth != 0 {
        return Err(ParseError::Truncated);
    }

    let results = deduplicate(results);
    debug!(count = results.len(), "Parsed xUnit report");
    Ok(results)
}

fn check_root(element: &BytesStart<'_>, seen_root: &mut bool) -> Result<(), ParseError> {
    if *seen_root {
        return Ok(());
    }
    *seen_root = true;

    match element.local_name().as_ref() {
        b"testsuites" | b"testsuite" => Ok(()),
        other => Err(ParseError::UnexpectedRoot(
            String::from_utf8_lossy(other).into_owned(),
        )),
    }
}

fn attribute(element: &BytesStart<'_>, name: &str) -> Result<Option<String>, ParseError> {
    match element.try_get_attribute(name)? {
        Some(attr) => Ok(Some(attr.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}

fn start_case(
    element: &BytesStart<'_>,
    suites: &[Option<String>],
) -> Result<PendingCase, ParseError> {
    let name = attribute(element, "name")?.ok_or(ParseError::UnnamedTestCase)?;
    Ok(PendingCase {
        name,
        classname: attribute(element, "classname")?,
        suite: suites.last().cloned().flatten(),
        ..PendingCase::default()
    })
}

fn mark_skipped(case: Option<&mut PendingCase>) {
    if let Some(case) = case {
        case.skipped = true;
    }
}

fn push_case(
    results: &mut Vec<TestResult>,
    case: PendingCase,
    build: &BuildInfo,
    naming: &PackageNaming,
) {
    // Skipped tests neither passed nor failed.
    if case.skipped {
        return;
    }

    let package = naming.package(case.suite.as_deref(), case.classname.as_deref());
    let failure_message = if case.failed {
        case.message
            .filter(|m| !m.is_empty())
            .or_else(|| Some(case.text.trim().to_string()).filter(|t| !t.is_empty()))
    } else {
        None
    };

    results.push(TestResult {
        identity: TestIdentity::test(package, case.name),
        outcome: if case.failed {
            Outcome::Failed
        } else {
            Outcome::Passed
        },
        failure_message,
        build: build.clone(),
    });
}

/// Drops subtests whose parent reported the same outcome, then repeated
/// identities, keeping first occurrences.
fn deduplicate(results: Vec<TestResult>) -> Vec<TestResult> {
    let parents: HashSet<(Option<String>, String, Outcome)> = results
        .iter()
        .filter_map(|r| {
            r.identity
                .test_case
                .clone()
                .map(|name| (r.identity.package.clone(), name, r.outcome))
        })
        .collect();

    let mut seen = HashSet::new();
    results
        .into_iter()
        .filter(|r| {
            let Some(name) = r.identity.test_case.as_deref() else {
                return true;
            };
            match name.split_once('/') {
                Some((parent, _)) => !parents.contains(&(
                    r.identity.package.clone(),
                    parent.to_string(),
                    r.outcome,
                )),
                None => true,
            }
        })
        .filter(|r| seen.insert((r.identity.key(), r.outcome)))
        .collect()
}
