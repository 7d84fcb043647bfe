//! Installation type detection.

use std::fmt;
use std::path::Path;

use async_trait::async_trait;

use super::{SystemInfo, SystemInfoProvider};

/// Environment variable set when running under the supervisor
const SUPERVISOR_ENV: &str = "SUPERVISOR";

/// Marker file present inside Docker containers
const DOCKER_MARKER: &str = "/.dockerenv";

const OS_RELEASE: &str = "/etc/os-release";

/// How the platform was installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallationType {
    /// Appliance OS managed by the supervisor
    Os,
    /// Supervisor on a generic Linux host
    Supervised,
    /// Plain container
    Container,
    /// Python package in a virtualenv or system install
    Core,
}

impl InstallationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Os => "Home Assistant OS",
            Self::Supervised => "Home Assistant Supervised",
            Self::Container => "Home Assistant Container",
            Self::Core => "Home Assistant Core",
        }
    }

    /// Classify from probed facts
    pub fn classify(probe: &SystemProbe) -> Self {
        if probe.supervisor {
            let is_os = probe
                .os_release
                .as_deref()
                .is_some_and(|r| r.lines().any(|l| l.trim() == "ID=haos"));
            if is_os { Self::Os } else { Self::Supervised }
        } else if probe.docker {
            Self::Container
        } else {
            Self::Core
        }
    }
}

impl fmt::Display for InstallationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw facts read from the environment.
#[derive(Debug, Clone, Default)]
pub struct SystemProbe {
    pub supervisor: bool,
    pub docker: bool,
    pub os_release: Option<String>,
}

impl SystemProbe {
    /// Probe the current process environment
    pub fn current() -> Self {
        Self {
            supervisor: std::env::var_os(SUPERVISOR_ENV).is_some(),
            docker: Path::new(DOCKER_MARKER).exists(),
            os_release: std::fs::read_to_string(OS_RELEASE).ok(),
        }
    }
}

/// System info read from the machine the process runs on.
#[derive(Debug, Clone)]
pub struct DetectedSystemInfo {
    info: SystemInfo,
}

impl DetectedSystemInfo {
    /// Probe the current machine once; the returned value keeps the result
    pub fn detect() -> Self {
        Self::from_probe(&SystemProbe::current())
    }

    pub fn from_probe(probe: &SystemProbe) -> Self {
        Self {
            info: SystemInfo {
                installation_type: InstallationType::classify(probe).to_string(),
                os_name: std::env::consts::OS.to_string(),
                arch: std::env::consts::ARCH.to_string(),
                docker: probe.docker,
            },
        }
    }
}

#[async_trait]
impl SystemInfoProvider for DetectedSystemInfo {
    async fn system_info(&self) -> SystemInfo {
        self.info.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_core() {
        assert_eq!(
            InstallationType::classify(&SystemProbe::default()),
            InstallationType::Core
        );
    }

    #[test]
    fn test_classify_container() {
        let probe = SystemProbe {
            docker: true,
            ..Default::default()
        };
        assert_eq!(InstallationType::classify(&probe), InstallationType::Container);
    }

    #[test]
    fn test_classify_supervised_wins_over_docker() {
        let probe = SystemProbe {
            supervisor: true,
            docker: true,
            os_release: Some("ID=debian\nVERSION_ID=12\n".to_string()),
        };
        assert_eq!(InstallationType::classify(&probe), InstallationType::Supervised);
    }

    #[test]
    fn test_classify_os() {
        let probe = SystemProbe {
            supervisor: true,
            docker: true,
            os_release: Some("NAME=\"Home Assistant OS\"\nID=haos\n".to_string()),
        };
        assert_eq!(InstallationType::classify(&probe), InstallationType::Os);
    }

    #[tokio::test]
    async fn test_detected_system_info() {
        let probe = SystemProbe {
            docker: true,
            ..Default::default()
        };
        let info = DetectedSystemInfo::from_probe(&probe).system_info().await;
        assert_eq!(info.installation_type, "Home Assistant Container");
        assert!(info.docker);
        assert!(!info.os_name.is_empty());
    }
}
