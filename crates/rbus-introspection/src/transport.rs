//! Transports that run `gdbus introspect` and hand back its output
//!
//! [`SshTransport`] runs the tool on a remote host over `ssh`;
//! [`LocalTransport`] runs it against the local bus. Both block until the
//! command exits and return its full stdout. There is no timeout and no retry.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use rbus_core::{BusType, DumpConfig, Error, Result};

/// Source of introspection output for one service
#[async_trait]
pub trait IntrospectionTransport: Send + Sync {
    /// Plain-text recursive dump of the object tree below the root path.
    async fn tree(&self) -> Result<String>;

    /// XML introspection document for a single object path.
    async fn introspect_xml(&self, path: &str) -> Result<String>;
}

/// Output format requested from `gdbus introspect`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntrospectMode {
    Recursive,
    Xml,
}

impl IntrospectMode {
    fn flag(&self) -> &'static str {
        match self {
            IntrospectMode::Recursive => "--recurse",
            IntrospectMode::Xml => "--xml",
        }
    }
}

/// Which service is introspected, on which bus, starting where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntrospectionTarget {
    pub bus: BusType,
    pub service: String,
    pub root: String,
}

impl IntrospectionTarget {
    pub fn from_config(config: &DumpConfig) -> Self {
        Self {
            bus: config.bus,
            service: config.service.clone(),
            root: config.root.clone(),
        }
    }

    /// `gdbus` argv for introspecting `path`
    pub fn gdbus_args(&self, path: &str, mode: IntrospectMode) -> Vec<String> {
        vec![
            "gdbus".to_string(),
            "introspect".to_string(),
            self.bus.gdbus_flag().to_string(),
            "--dest".to_string(),
            self.service.clone(),
            "--object-path".to_string(),
            path.to_string(),
            mode.flag().to_string(),
        ]
    }
}

/// Runs `gdbus` on a remote host through the system `ssh` client
#[derive(Debug, Clone)]
pub struct SshTransport {
    destination: String,
    port: Option<u16>,
    identity: Option<PathBuf>,
    target: IntrospectionTarget,
    program: String,
}

impl SshTransport {
    pub fn new(destination: impl Into<String>, target: IntrospectionTarget) -> Self {
        Self {
            destination: destination.into(),
            port: None,
            identity: None,
            target,
            program: "ssh".to_string(),
        }
    }

    /// Build from config; fails when no host is configured.
    pub fn from_config(config: &DumpConfig) -> Result<Self> {
        let destination = config
            .destination()
            .ok_or_else(|| Error::invalid_argument("no SSH host configured"))?;

        let mut transport = Self::new(destination, IntrospectionTarget::from_config(config));
        transport.port = config.port;
        transport.identity = config.identity.clone();
        Ok(transport)
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_identity(mut self, identity: impl Into<PathBuf>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    /// Use a different client binary than `ssh`.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Full `ssh` argv (without the program) running `remote` on the host.
    pub fn ssh_args(&self, remote: &[String]) -> Vec<String> {
        // BatchMode makes auth failures exit instead of prompting
        let mut args = vec!["-o".to_string(), "BatchMode=yes".to_string()];

        if let Some(port) = self.port {
            args.push("-p".to_string());
            args.push(port.to_string());
        }
        if let Some(ref identity) = self.identity {
            args.push("-i".to_string());
            args.push(identity.display().to_string());
        }

        args.push(self.destination.clone());
        args.extend(remote.iter().cloned());
        args
    }

    async fn introspect(&self, path: &str, mode: IntrospectMode) -> Result<String> {
        let remote = self.target.gdbus_args(path, mode);
        run_command(&self.program, &self.ssh_args(&remote)).await
    }
}

#[async_trait]
impl IntrospectionTransport for SshTransport {
    async fn tree(&self) -> Result<String> {
        self.introspect(&self.target.root, IntrospectMode::Recursive).await
    }

    async fn introspect_xml(&self, path: &str) -> Result<String> {
        self.introspect(path, IntrospectMode::Xml).await
    }
}

/// Runs `gdbus` on this machine
#[derive(Debug, Clone)]
pub struct LocalTransport {
    target: IntrospectionTarget,
    program: Option<String>,
}

impl LocalTransport {
    pub fn new(target: IntrospectionTarget) -> Self {
        Self {
            target,
            program: None,
        }
    }

    pub fn from_config(config: &DumpConfig) -> Self {
        Self::new(IntrospectionTarget::from_config(config))
    }

    /// Replace the `gdbus` binary; the remaining arguments are unchanged.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = Some(program.into());
        self
    }

    async fn introspect(&self, path: &str, mode: IntrospectMode) -> Result<String> {
        let mut argv = self.target.gdbus_args(path, mode);
        let default_program = argv.remove(0);
        let program = self.program.as_deref().unwrap_or(default_program.as_str());
        run_command(program, &argv).await
    }
}

#[async_trait]
impl IntrospectionTransport for LocalTransport {
    async fn tree(&self) -> Result<String> {
        self.introspect(&self.target.root, IntrospectMode::Recursive).await
    }

    async fn introspect_xml(&self, path: &str) -> Result<String> {
        self.introspect(path, IntrospectMode::Xml).await
    }
}

/// Run `program` with `args` to completion and return its stdout.
async fn run_command(program: &str, args: &[String]) -> Result<String> {
    let command_line = format!("{} {}", program, args.join(" "));
    debug!(command = %command_line, "Running introspection command");

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| Error::spawn(program, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(Error::remote_command(
            command_line,
            output.status.to_string(),
            stderr,
        ));
    }

    let stdout = String::from_utf8(output.stdout).map_err(|e| {
        Error::internal(format!(
            "`{}` produced non-UTF-8 output: {}",
            command_line, e
        ))
    })?;

    debug!(bytes = stdout.len(), "Command completed");
    Ok(stdout)
}
