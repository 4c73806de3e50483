use std::fmt;

use super::SELECT_ALL;

/// One step of a multi-step snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    /// 1-based position, contiguous across the returned list.
    pub index: usize,
    /// Non-empty selection patterns, in marker-file order.
    pub lines: Vec<String>,
    /// Script in `snap/` to run before applying this stage.
    pub pre: Option<String>,
}

impl Stage {
    /// The stage used when a project defines no numbered markers.
    pub fn select_all() -> Self {
        Self {
            index: 1,
            lines: vec![SELECT_ALL.to_string()],
            pre: None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stage {}", self.index)?;
        if let Some(pre) = &self.pre {
            write!(f, " (pre: {})", pre)?;
        }
        for line in &self.lines {
            write!(f, "\n  {}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lists_pre_script_and_patterns() {
        let stage = Stage {
            index: 2,
            lines: vec!["src".into(), "Cargo.toml".into()],
            pre: Some("pre_2".into()),
        };
        assert_eq!(stage.to_string(), "stage 2 (pre: pre_2)\n  src\n  Cargo.toml");
        assert_eq!(Stage::select_all().to_string(), "stage 1\n  .");
    }
}
