use console::{Term, style};
use gittalent::sync::SyncProgress;

/// Interactive reporter writing one styled line per event to stderr.
pub struct InteractiveReporter {
    term: Term,
}

impl InteractiveReporter {
    pub fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }

    pub fn handle(&self, event: SyncProgress) {
        if let Some(line) = Self::render(&event) {
            // Losing a status line is not worth failing the sync over
            let _ = self.term.write_line(&line);
        }
    }

    fn render(event: &SyncProgress) -> Option<String> {
        let line = match event {
            SyncProgress::FetchingProfile { handle, via_proxy } => {
                let source = if *via_proxy { "installation proxy" } else { "GitHub" };
                format!("{} Fetching {} from {}...", style("→").cyan(), style(handle).bold(), source)
            }
            SyncProgress::CacheHit { handle } => {
                format!("{} Using cached profile for {}", style("↺").dim(), handle)
            }
            SyncProgress::JoinedInFlight { handle } => {
                format!("{} Waiting for the running fetch of {}", style("…").dim(), handle)
            }
            SyncProgress::SnapshotReady {
                handle,
                repos,
                total_stars,
                languages,
                active_days,
            } => format!(
                "{} {}: {} repos, {} stars, {} languages, {} active days",
                style("✓").green(),
                style(handle).bold(),
                repos,
                total_stars,
                languages,
                active_days
            ),
            SyncProgress::FetchFailed { handle, message } => {
                format!("{} {}: {}", style("✗").red(), style(handle).bold(), message)
            }
            SyncProgress::ProfileUpdated {
                languages, projects, ..
            } => format!(
                "{} Profile saved ({} languages, {} projects)",
                style("✓").green(),
                languages,
                projects
            ),
            SyncProgress::WriteSkipped { reason, .. } => {
                format!("{} Profile not updated: {}", style("!").yellow(), reason)
            }
            SyncProgress::WriteFailed { message, .. } => {
                format!("{} Could not save profile: {}", style("✗").red(), message)
            }
            _ => return None,
        };
        Some(line)
    }
}

impl Default for InteractiveReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use gittalent::sync::SkipReason;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn snapshot_line_lists_counts() {
        let line = InteractiveReporter::render(&SyncProgress::SnapshotReady {
            handle: "octocat".to_string(),
            repos: 4,
            total_stars: 16,
            languages: 5,
            active_days: 120,
        })
        .expect("rendered");
        assert!(line.contains("octocat"));
        assert!(line.contains("16 stars"));
        assert!(line.contains("120 active days"));
    }

    #[test]
    fn skip_line_includes_reason() {
        let line = InteractiveReporter::render(&SyncProgress::WriteSkipped {
            user_id: Uuid::nil(),
            reason: SkipReason::ProfileMissing,
        })
        .expect("rendered");
        assert!(line.contains("developer profile not found"));
    }
}
