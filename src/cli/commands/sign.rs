use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use uuid::Uuid;

use crate::contract::{DealStage, Party};
use crate::workflow::SignatureUpload;

use super::{with_orchestrator, Command};

pub struct SignCommand {
    pub contract: Uuid,
    pub party: Party,
    pub image: Option<PathBuf>,
}

impl SignCommand {
    pub fn new(contract: Uuid, party: Party, image: Option<PathBuf>) -> Self {
        Self {
            contract,
            party,
            image,
        }
    }
}

impl Command for SignCommand {
    async fn execute(&self) -> Result<()> {
        let (contract_id, party) = (self.contract, self.party);
        let upload = match &self.image {
            Some(path) => Some(read_signature_image(path)?),
            None => None,
        };

        with_orchestrator(|orchestrator| async move {
            match orchestrator.sign_contract(contract_id, party, upload).await {
                Ok(contract) => {
                    println!();
                    println!("🖋️  Recorded the {party} signature on {}", contract.id);
                    if contract.signatures.fully_signed() {
                        println!("   ✅ Both parties have signed");
                    }
                    println!();
                    println!("🎯 NEXT STEPS:");
                    if contract.stage == DealStage::Signed && contract.signatures.fully_signed() {
                        println!(
                            "   → Close the deal out: dugout advance {} completed",
                            contract.id
                        );
                    } else {
                        println!(
                            "   → Waiting on the team signature: dugout sign {} team",
                            contract.id
                        );
                    }
                    Ok(())
                }
                Err(e) => {
                    println!("❌ Could not record the signature: {e}");
                    Err(e.into())
                }
            }
        })
        .await
    }
}

fn read_signature_image(path: &Path) -> Result<SignatureUpload> {
    let bytes = std::fs::read(path)
        .map_err(|e| anyhow!("could not read signature image {}: {e}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("signature.bin")
        .to_string();
    let content_type = match path.extension().and_then(|ext| ext.to_str()) {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
    .to_string();
    Ok(SignatureUpload {
        file_name,
        content_type,
        bytes,
    })
}
