// SPDX-License-Identifier: Apache-2.0

//! Sign a 100 USDT transfer on Ethereum mainnet
//!
//! The calldata fits into the request, so the host never gets asked for more.

use std::error::Error;

use demo_support::{init_logging, load_settings, ConsoleUi, SoftwareSecureElement};
use evm_signer_device_base::DerivationPath;
use evm_signer_eth_app::constants::selector;
use evm_signer_eth_app::EthSigner;
use evm_signer_transport::{DeviceResponse, HostRequest, SignLegacyTx};
use evm_signer_transport_script::ScriptedHost;

const USDT: &str = "dac17f958d2ee523a2206206994597c13d831ec7";
const RECIPIENT: &str = "742d35cc6634c0532925a3b844bc9e7595f0beb0";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_logging();

    let mut data = selector::ERC20_TRANSFER.to_vec();
    data.extend_from_slice(&[0u8; 12]);
    data.extend_from_slice(&hex::decode(RECIPIENT)?);
    let mut amount = [0u8; 32];
    amount[28..].copy_from_slice(&100_000_000u32.to_be_bytes());
    data.extend_from_slice(&amount);

    let path = DerivationPath::ethereum_standard(0, 0);
    let request = SignLegacyTx::new(path.indices().to_vec(), 1)
        .with_nonce(vec![0x2a])
        .with_gas(hex::decode("04a817c800")?, hex::decode("fde8")?)
        .with_to(hex::decode(USDT)?)
        .with_data(data);

    println!("📤 Signing ERC-20 transfer with {}", path);
    let mut signer = EthSigner::new(
        ScriptedHost::new(),
        ConsoleUi,
        SoftwareSecureElement::from_env()?,
        load_settings()?,
    );

    match signer.handle(HostRequest::SignLegacyTx(request)).await {
        DeviceResponse::TxSignature(signature) => {
            println!("\n✅ Signature received:");
            println!("   v: {}", signature.v);
            println!("   r: 0x{}", hex::encode(signature.r));
            println!("   s: 0x{}", hex::encode(signature.s));
        }
        DeviceResponse::Failure(failure) => {
            eprintln!("\n❌ {:?}: {}", failure.code, failure.message);
        }
        other => eprintln!("\n❌ Unexpected response {:?}", other),
    }
    Ok(())
}
