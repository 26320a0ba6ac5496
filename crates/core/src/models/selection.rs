use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which projects are visible on the chart.
///
/// Two states only: every project, or exactly an explicit subset. The
/// subset may name projects the data doesn't contain; those are ignored
/// when rows are combined.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Selection {
    #[default]
    All,
    Subset(BTreeSet<String>),
}

impl Selection {
    /// Subset containing exactly `projects`.
    pub fn subset<I, S>(projects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Selection::Subset(projects.into_iter().map(Into::into).collect())
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    /// Toggle back to showing every project.
    pub fn show_all(&mut self) {
        *self = Selection::All;
    }

    /// Narrow to exactly `projects` (replacing any previous subset).
    pub fn narrow<I, S>(&mut self, projects: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self = Selection::subset(projects);
    }

    /// Narrow to a single project.
    pub fn select_only(&mut self, project: impl Into<String>) {
        *self = Selection::subset([project.into()]);
    }

    /// Flip one project's visibility.
    ///
    /// From `All` this narrows to just that project (the single-pick
    /// behaviour of the investment selector); within a subset it adds or
    /// removes the project.
    pub fn toggle(&mut self, project: impl Into<String>) {
        let project = project.into();
        match self {
            Selection::All => *self = Selection::subset([project]),
            Selection::Subset(set) => {
                if !set.remove(&project) {
                    set.insert(project);
                }
            }
        }
    }

    pub fn is_active(&self, project: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Subset(set) => set.contains(project),
        }
    }

    /// The active subset of `projects`, in the order given.
    pub fn active_projects<'a>(&self, projects: &'a [String]) -> Vec<&'a str> {
        projects
            .iter()
            .filter(|p| self.is_active(p))
            .map(String::as_str)
            .collect()
    }
}
