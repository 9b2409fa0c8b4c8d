use std::{
    fmt::{Display, Formatter},
    path::Path,
};

use chrono::Utc;
use log::*;
use tokio::process::Command;

use crate::{errors::PrintError, order_types::PrintJob, traits::DocumentPrinter};

/// What a print job carries, for logging and retry decisions at the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Label,
    PackingSlip,
}

impl Display for JobKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            JobKind::Label => write!(f, "label"),
            JobKind::PackingSlip => write!(f, "packing slip"),
        }
    }
}

/// The `(server, queue)` pair jobs are submitted to.
#[derive(Debug, Clone, Default)]
pub struct PrinterTarget {
    pub server_uri: String,
    pub printer_name: String,
}

impl Display for PrinterTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.printer_name, self.server_uri)
    }
}

/// Submits documents to a CUPS queue via `lp`. In dry-run mode the intended
/// job is logged and reported as accepted without touching the spooler, so
/// a test or rehearsal run never double-prints anything.
pub struct CupsPrinter {
    target: PrinterTarget,
    dry_run: bool,
}

impl CupsPrinter {
    pub fn new(target: PrinterTarget, dry_run: bool) -> Self {
        Self { target, dry_run }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Ask the CUPS server whether the configured queue exists and answers.
    /// Dry-run mode skips the check; there is nothing to reach.
    pub async fn check_printer(&self) -> Result<(), PrintError> {
        if self.dry_run {
            return Ok(());
        }
        let output = Command::new("lpstat")
            .args(["-h", &self.target.server_uri, "-p", &self.target.printer_name])
            .output()
            .await?;
        if output.status.success() {
            info!("🖨️ Printer {} is reachable", self.target);
            Ok(())
        } else {
            let detail = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!("🖨️ Printer {} is not reachable: {detail}", self.target);
            Err(PrintError::PrinterUnavailable { printer: self.target.to_string(), detail })
        }
    }
}

impl DocumentPrinter for CupsPrinter {
    async fn submit(&self, document: &Path, kind: JobKind) -> Result<PrintJob, PrintError> {
        if self.dry_run {
            info!("🖨️ DRY RUN: would print {kind} {} on {}", document.display(), self.target);
            return Ok(PrintJob {
                document: document.to_path_buf(),
                printer: self.target.printer_name.clone(),
                accepted: true,
                submitted_at: Utc::now(),
            });
        }
        if !document.exists() {
            return Err(PrintError::MissingDocument(document.to_path_buf()));
        }
        debug!("🖨️ Submitting {kind} {} to {}", document.display(), self.target);
        let output = Command::new("lp")
            .args(["-h", &self.target.server_uri, "-d", &self.target.printer_name])
            .arg(document)
            .output()
            .await?;
        if !output.status.success() {
            let detail = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(PrintError::Rejected { document: document.to_path_buf(), detail });
        }
        info!("🖨️ Printed {kind} {} on {}", document.display(), self.target);
        Ok(PrintJob {
            document: document.to_path_buf(),
            printer: self.target.printer_name.clone(),
            accepted: true,
            submitted_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn target() -> PrinterTarget {
        PrinterTarget { server_uri: "192.168.8.194".to_string(), printer_name: "labelwriter".to_string() }
    }

    #[tokio::test]
    async fn dry_run_accepts_without_invoking_the_spooler() {
        // The document does not exist, so a real submission would fail before
        // ever spawning `lp`; dry-run must succeed anyway.
        let printer = CupsPrinter::new(target(), true);
        let job = printer.submit(Path::new("/no/such/file.pdf"), JobKind::Label).await.unwrap();
        assert!(job.accepted);
        assert_eq!(job.printer, "labelwriter");
    }

    #[tokio::test]
    async fn missing_documents_are_rejected_before_spawning() {
        let printer = CupsPrinter::new(target(), false);
        match printer.submit(Path::new("/no/such/file.pdf"), JobKind::PackingSlip).await {
            Err(PrintError::MissingDocument(path)) => assert_eq!(path, Path::new("/no/such/file.pdf")),
            other => panic!("expected MissingDocument, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn dry_run_skips_the_printer_check() {
        let printer = CupsPrinter::new(target(), true);
        printer.check_printer().await.unwrap();
    }
}
