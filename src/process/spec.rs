// src/process/spec.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Description of the command the watch loop keeps restarting.
///
/// Built once by the caller. Within the loop only `arguments` (through the
/// filter pipeline) and `environment` (iteration variables) ever change.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessSpec {
    pub executable: String,
    pub arguments: Vec<String>,
    /// Merged over the inherited environment of the supervisor.
    pub environment: BTreeMap<String, String>,
    pub working_directory: Option<PathBuf>,
    pub display_name: Option<String>,
}

impl ProcessSpec {
    pub fn new<E, I, A>(executable: E, arguments: I) -> Self
    where
        E: Into<String>,
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        Self {
            executable: executable.into(),
            arguments: arguments.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    pub fn with_working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Name used in status messages: the explicit display name, or the file
    /// stem of the executable (`/usr/bin/dotnet` -> `dotnet`).
    pub fn short_display_name(&self) -> String {
        if let Some(name) = &self.display_name {
            return name.clone();
        }

        Path::new(&self.executable)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.executable.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_display_name_uses_file_stem() {
        let spec = ProcessSpec::new("/usr/share/dotnet/dotnet.exe", ["run"]);
        assert_eq!(spec.short_display_name(), "dotnet");
    }

    #[test]
    fn explicit_display_name_wins() {
        let spec = ProcessSpec::new("dotnet", ["run"]).with_display_name("api");
        assert_eq!(spec.short_display_name(), "api");
    }
}
