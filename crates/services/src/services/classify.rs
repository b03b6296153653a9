//! Title-based task classification for the work-distribution chart.

use serde::Serialize;

/// Work categories inferred from a task title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TaskKind {
    Features,
    Bugs,
    TechDebt,
    Research,
}

impl TaskKind {
    pub const ALL: [TaskKind; 4] = [
        TaskKind::Features,
        TaskKind::Bugs,
        TaskKind::TechDebt,
        TaskKind::Research,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TaskKind::Features => "Features",
            TaskKind::Bugs => "Bugs",
            TaskKind::TechDebt => "Tech Debt",
            TaskKind::Research => "Research",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            TaskKind::Features => "#7c3aed",
            TaskKind::Bugs => "#ef4444",
            TaskKind::TechDebt => "#f59e0b",
            TaskKind::Research => "#10b981",
        }
    }
}

/// Classify a task by keyword lookup in its title. Matching is
/// case-sensitive substring search; the first matching group wins, and
/// anything unmatched counts as feature work.
pub fn classify_title(title: &str) -> TaskKind {
    if ["bug", "fix", "error"].iter().any(|kw| title.contains(kw)) {
        TaskKind::Bugs
    } else if ["refactor", "tech debt", "clean"]
        .iter()
        .any(|kw| title.contains(kw))
    {
        TaskKind::TechDebt
    } else if ["research", "spike"].iter().any(|kw| title.contains(kw)) {
        TaskKind::Research
    } else {
        TaskKind::Features
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_groups_are_checked_in_order() {
        assert_eq!(classify_title("fix login bug"), TaskKind::Bugs);
        assert_eq!(classify_title("refactor auth module"), TaskKind::TechDebt);
        assert_eq!(classify_title("pay down tech debt"), TaskKind::TechDebt);
        assert_eq!(classify_title("research caching options"), TaskKind::Research);
        assert_eq!(classify_title("add dark mode"), TaskKind::Features);
        // Bug keywords take precedence over later groups.
        assert_eq!(classify_title("fix refactor fallout"), TaskKind::Bugs);
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert_eq!(classify_title("Fix login"), TaskKind::Features);
        assert_eq!(classify_title("Research options"), TaskKind::Features);
    }
}
