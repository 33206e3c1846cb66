// SPDX-License-Identifier: Apache-2.0

//! Sign a USDC permit given as `eth_signTypedData_v4` JSON
//!
//! The JSON helper plays the host and answers every struct and value request.

use std::error::Error;

use demo_support::{init_logging, load_settings, ConsoleUi, SoftwareSecureElement};
use evm_signer_device_base::DerivationPath;
use evm_signer_eth_app::{EthSigner, TypedDataJson};
use evm_signer_transport::{DeviceResponse, HostRequest};

const USDC_PERMIT: &str = r#"{"domain":{"name":"USD Coin","verifyingContract":"0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48","chainId":1,"version":"2"},"primaryType":"Permit","message":{"deadline":1718992051,"nonce":0,"spender":"0x111111125421ca6dc452d289314280a0f8842a65","owner":"0x6cbcd73cd8e8a42844662f0a0e76d7f79afd933d","value":"115792089237316195423570985008687907853269984665640564039457584007913129639935"},"types":{"EIP712Domain":[{"name":"name","type":"string"},{"name":"version","type":"string"},{"name":"chainId","type":"uint256"},{"name":"verifyingContract","type":"address"}],"Permit":[{"name":"owner","type":"address"},{"name":"spender","type":"address"},{"name":"value","type":"uint256"},{"name":"nonce","type":"uint256"},{"name":"deadline","type":"uint256"}]}}"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_logging();

    let json = match std::env::args().nth(1) {
        Some(file) => std::fs::read_to_string(file)?,
        None => USDC_PERMIT.to_string(),
    };
    let host = TypedDataJson::from_json(&json)?;
    let path = DerivationPath::ethereum_standard(0, 0);
    let request = host.request(path.indices().to_vec());

    println!("📋 Signing {} typed data with {}", host.primary_type(), path);
    let mut signer = EthSigner::new(
        host,
        ConsoleUi,
        SoftwareSecureElement::from_env()?,
        load_settings()?,
    );

    match signer.handle(HostRequest::SignTypedData(request)).await {
        DeviceResponse::TypedDataSignature(signature) => {
            println!("\n✅ Signature received:");
            println!("   signer:    0x{}", hex::encode(signature.address));
            println!("   signature: 0x{}", hex::encode(&signature.signature));
        }
        DeviceResponse::Failure(failure) => {
            eprintln!("\n❌ {:?}: {}", failure.code, failure.message);
        }
        other => eprintln!("\n❌ Unexpected response {:?}", other),
    }
    Ok(())
}
