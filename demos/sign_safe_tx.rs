// SPDX-License-Identifier: Apache-2.0

//! Sign a Safe delegatecall whose call data does not fit into one chunk
//!
//! Watch for the danger accent and the delegatecall banner on the screens.

use std::error::Error;

use demo_support::{init_logging, load_settings, ConsoleUi, SoftwareSecureElement};
use evm_signer_device_base::DerivationPath;
use evm_signer_eth_app::constants::length::MAX_CHUNK_SIZE;
use evm_signer_eth_app::EthSigner;
use evm_signer_transport::{DeviceResponse, HostRequest, SignSafeTx};
use evm_signer_transport_script::ScriptedHost;

const SAFE: &str = "5afe3855358e112b5647b952709e6165e1c1eeee";
const MULTI_SEND: &str = "40a2accbd92bca938b02010e17a5b8929b49130d";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_logging();

    let data: Vec<u8> = (0..1500u32).map(|i| (i % 251) as u8).collect();
    let path = DerivationPath::ethereum_standard(0, 0);
    let request = SignSafeTx {
        address_n: path.indices().to_vec(),
        chain_id: 1,
        verifying_contract: hex::decode(SAFE)?,
        to: hex::decode(MULTI_SEND)?,
        data_initial_chunk: data[..MAX_CHUNK_SIZE].to_vec(),
        data_length: data.len() as u32,
        operation: 1,
        nonce: vec![0x0c],
        ..Default::default()
    };

    println!("🔐 Signing Safe delegatecall with {}", path);
    let mut signer = EthSigner::new(
        ScriptedHost::with_tx_data(data[MAX_CHUNK_SIZE..].to_vec()),
        ConsoleUi,
        SoftwareSecureElement::from_env()?,
        load_settings()?,
    );

    match signer.handle(HostRequest::SignSafeTx(request)).await {
        DeviceResponse::SafeSignature(signature) => {
            println!("\n✅ Owner signature: 0x{}", hex::encode(&signature.signature));
            println!("   streamed requests: {}", signer.link().requests().len());
        }
        DeviceResponse::Failure(failure) => {
            eprintln!("\n❌ {:?}: {}", failure.code, failure.message);
        }
        other => eprintln!("\n❌ Unexpected response {:?}", other),
    }
    Ok(())
}
