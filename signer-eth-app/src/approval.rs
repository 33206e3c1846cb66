// SPDX-License-Identifier: Apache-2.0

//! Approval flow: turns a classified request into screens and walks the user through them

use evm_signer_device_base::{
    Accent, Banner, DeviceError, DeviceSettings, Property, Screen, Ui, UiExt,
};
use log::{info, warn};
use num_bigint::BigUint;
use num_traits::Zero;

use crate::classify::{classify, Classification, SafeExecCall};
use crate::format::{
    checksum_address, format_amount, format_gwei, format_hex, format_native_amount,
    format_token_amount, max_uint256,
};
use crate::networks::NetworkInfo;
use crate::providers::provider_by_address;
use crate::tokens::{token_by_address, UNKNOWN_TOKEN_SYMBOL};

pub const DELEGATECALL_WARNING: &str =
    "delegatecall could allow external code to control your wallet";
pub const UNKNOWN_TOKEN_WARNING: &str = "Unknown token, check the contract address";
pub const BLIND_SIGNING_WARNING: &str = "The data of this transaction cannot be decoded";
pub const UNKNOWN_LAYOUT_WARNING: &str = "Known function with unexpected arguments";

/// Bytes of calldata shown on the data page
const DATA_PREVIEW: usize = 256;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ApproveAction {
    /// Allowance set to zero
    Revoke,
    /// Allowance set to 2^256 - 1
    ApproveUnlimited,
    Approve,
}

impl ApproveAction {
    pub fn from_value(value: &BigUint) -> Self {
        if value.is_zero() {
            ApproveAction::Revoke
        } else if *value == max_uint256() {
            ApproveAction::ApproveUnlimited
        } else {
            ApproveAction::Approve
        }
    }
}

/// Title of an approval, from the known token symbol and provider name
pub fn approve_title(action: ApproveAction, token: Option<&str>, provider: Option<&str>) -> String {
    match (action, token, provider) {
        (ApproveAction::Revoke, Some(token), Some(provider)) => {
            format!("Revoke {} from {}", token, provider)
        }
        (ApproveAction::Revoke, Some(token), None) => format!("Revoke {} approval", token),
        (ApproveAction::Revoke, None, Some(provider)) => format!("Revoke token from {}", provider),
        (ApproveAction::Revoke, None, None) => "Revoke token approval".to_string(),
        (ApproveAction::ApproveUnlimited, Some(token), Some(provider)) => {
            format!("Approve unlimited {} for {}", token, provider)
        }
        (ApproveAction::ApproveUnlimited, Some(token), None) => {
            format!("Approve unlimited {}", token)
        }
        (ApproveAction::ApproveUnlimited, None, Some(provider)) => {
            format!("Approve unlimited token for {}", provider)
        }
        (ApproveAction::ApproveUnlimited, None, None) => "Approve unlimited token".to_string(),
        (ApproveAction::Approve, Some(token), Some(provider)) => {
            format!("Approve {} for {}", token, provider)
        }
        (ApproveAction::Approve, Some(token), None) => format!("Approve {}", token),
        (ApproveAction::Approve, None, Some(provider)) => {
            format!("Approve token for {}", provider)
        }
        (ApproveAction::Approve, None, None) => "Approve token".to_string(),
    }
}

/// Screens of one approval flow
///
/// The preamble is always shown. The overview offers the detail pages; the
/// confirm page ends the flow. Turbo mode folds overview, details and confirm
/// into a single page.
#[derive(Clone, Debug)]
pub struct Review {
    pub preamble: Vec<Screen>,
    pub overview: Screen,
    pub details: Vec<Screen>,
    pub confirm: Screen,
}

impl Review {
    pub fn new(overview: Screen, confirm: Screen) -> Self {
        Review {
            preamble: Vec::new(),
            overview,
            details: Vec::new(),
            confirm,
        }
    }

    pub fn with_preamble(mut self, screen: Screen) -> Self {
        self.preamble.push(screen);
        self
    }

    pub fn with_details(mut self, screen: Screen) -> Self {
        self.details.push(screen);
        self
    }

    pub fn with_accent(mut self, accent: Accent) -> Self {
        for screen in self
            .preamble
            .iter_mut()
            .chain(std::iter::once(&mut self.overview))
            .chain(self.details.iter_mut())
            .chain(std::iter::once(&mut self.confirm))
        {
            screen.accent = accent;
        }
        self
    }

    fn collapsed(self) -> Screen {
        let mut screen = Screen::confirm(self.overview.title.clone())
            .with_accent(self.overview.accent);
        if let Some(subtitle) = &self.overview.subtitle {
            screen = screen.with_subtitle(subtitle.clone());
        }
        for page in std::iter::once(self.overview)
            .chain(self.details)
            .chain(std::iter::once(self.confirm))
        {
            for property in page.properties {
                if screen.property(&property.label).is_none() {
                    screen.properties.push(property);
                }
            }
            for banner in page.banners {
                if !screen.has_banner(&banner.text) {
                    screen.banners.push(banner);
                }
            }
            if page.accent == Accent::Danger {
                screen.accent = Accent::Danger;
            }
        }
        screen
    }

    pub async fn walk<U>(self, ui: &U, settings: &DeviceSettings) -> Result<(), DeviceError>
    where
        U: Ui + Sync + ?Sized,
    {
        for screen in self.preamble.iter().cloned() {
            ui.confirm(screen).await?;
        }

        if settings.turbo_mode() {
            return ui.confirm(self.collapsed()).await;
        }

        if ui.confirm_or_details(self.overview).await? {
            for screen in self.details {
                ui.confirm(screen).await?;
            }
        }
        ui.confirm(self.confirm).await
    }
}

/// Fee information shown on the final page
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeeSummary {
    /// Upper bound of what the transaction can cost in gas
    pub max_fee: BigUint,
    pub properties: Vec<Property>,
}

impl FeeSummary {
    pub fn legacy(gas_price: &BigUint, gas_limit: &BigUint) -> Self {
        FeeSummary {
            max_fee: gas_price * gas_limit,
            properties: vec![
                Property::new("Gas price", format_gwei(gas_price)),
                Property::new("Gas limit", gas_limit.to_string()),
            ],
        }
    }

    pub fn eip1559(max_gas_fee: &BigUint, max_priority_fee: &BigUint, gas_limit: &BigUint) -> Self {
        FeeSummary {
            max_fee: max_gas_fee * gas_limit,
            properties: vec![
                Property::new("Max fee per gas", format_gwei(max_gas_fee)),
                Property::new("Priority fee per gas", format_gwei(max_priority_fee)),
                Property::new("Gas limit", gas_limit.to_string()),
            ],
        }
    }
}

/// Everything the transaction review needs
pub struct TxReview<'a> {
    pub network: NetworkInfo,
    /// `None` for contract creation
    pub to: Option<[u8; 20]>,
    pub value: BigUint,
    pub classification: &'a Classification,
    pub data_length: u32,
    pub data_initial_chunk: &'a [u8],
    pub fee: FeeSummary,
}

impl TxReview<'_> {
    fn address(&self, address: &[u8; 20]) -> String {
        checksum_address(address, self.network.chain_id)
    }

    fn needs_blind_signing(&self) -> bool {
        match self.classification {
            Classification::Unknown => true,
            Classification::PlainTransfer => self.to.is_none() || self.data_length > 0,
            _ => false,
        }
    }

    fn confirm_screen(&self, title: &str) -> Screen {
        let mut screen = Screen::confirm(title);
        if !self.value.is_zero() {
            screen = screen.with_property(Property::new(
                "Amount",
                format_native_amount(&self.value, &self.network),
            ));
        }
        screen
            .with_property(Property::new(
                "Max fees",
                format_native_amount(&self.fee.max_fee, &self.network),
            ))
            .with_properties(self.fee.properties.iter().cloned())
    }

    fn network_property(&self) -> Property {
        if self.network.known {
            Property::new("Network", self.network.name)
        } else {
            Property::new("Network", format!("Chain ID {}", self.network.chain_id))
        }
    }

    fn data_page(&self) -> Screen {
        let preview = &self.data_initial_chunk[..self.data_initial_chunk.len().min(DATA_PREVIEW)];
        let mut data = format_hex(preview);
        if (self.data_length as usize) > preview.len() {
            data.push_str("...");
        }
        Screen::details("View Data")
            .with_property(Property::new("Size", format!("{} bytes", self.data_length)))
            .with_property(Property::data("Data", data))
    }

    fn plain_review(&self) -> Review {
        let amount = format_native_amount(&self.value, &self.network);
        let overview = match self.to {
            Some(to) => Screen::overview(format!("Send {}", amount))
                .with_property(Property::new("To", self.address(&to))),
            None => Screen::overview("Deploy contract")
                .with_property(Property::new("Amount", amount.clone())),
        };
        let mut details = Screen::details("Transaction details").with_property(self.network_property());
        if let Some(to) = self.to {
            details = details.with_property(Property::new("To", self.address(&to)));
        }
        details = details.with_property(Property::new("Amount", amount));

        Review::new(overview, self.confirm_screen("Sign transaction")).with_details(details)
    }

    fn blind_review(&self) -> Review {
        let mut review = self.plain_review();
        if self.to.is_some() && self.value.is_zero() {
            review.overview.title = "Contract interaction".to_string();
        }
        review.overview = review.overview.with_banner(Banner::warning(BLIND_SIGNING_WARNING));
        if *self.classification == Classification::Unknown {
            review.overview = review
                .overview
                .with_banner(Banner::warning(UNKNOWN_LAYOUT_WARNING));
        }
        review.with_preamble(self.data_page())
    }

    fn token_transfer_review(
        &self,
        token_address: &[u8; 20],
        recipient: &[u8; 20],
        amount: &BigUint,
    ) -> Review {
        let token = token_by_address(self.network.chain_id, token_address);
        let amount_text = match token {
            Some(token) => format_token_amount(amount, token.decimals, token.symbol),
            None => format_token_amount(amount, 0, UNKNOWN_TOKEN_SYMBOL),
        };

        let mut overview = Screen::overview(format!("Send {}", amount_text))
            .with_property(Property::new("To", self.address(recipient)));
        if token.is_none() {
            overview = overview.with_banner(Banner::warning(UNKNOWN_TOKEN_WARNING));
        }
        let details = Screen::details("Transaction details")
            .with_property(Property::new("Token contract", self.address(token_address)))
            .with_property(Property::new("Recipient", self.address(recipient)))
            .with_property(Property::new("Amount", amount_text))
            .with_property(self.network_property());

        Review::new(overview, self.confirm_screen("Sign transaction")).with_details(details)
    }

    fn approve_review(&self, token_address: &[u8; 20], spender: &[u8; 20], value: &BigUint) -> Review {
        let chain_id = self.network.chain_id;
        let token = token_by_address(chain_id, token_address);
        let provider = provider_by_address(chain_id, spender);
        let action = ApproveAction::from_value(value);
        let title = approve_title(action, token.map(|t| t.symbol), provider.map(|p| p.name));

        let amount = match (action, token) {
            (ApproveAction::ApproveUnlimited, _) => "Unlimited".to_string(),
            (_, Some(token)) => format_token_amount(value, token.decimals, token.symbol),
            (_, None) => format_token_amount(value, 0, UNKNOWN_TOKEN_SYMBOL),
        };
        let spender_text = match provider {
            Some(provider) => format!("{} ({})", provider.name, self.address(spender)),
            None => self.address(spender),
        };

        let mut overview = Screen::overview(title)
            .with_property(Property::new(
                "Token",
                token.map_or(UNKNOWN_TOKEN_SYMBOL, |t| t.symbol),
            ))
            .with_property(Property::new("Spender", spender_text))
            .with_property(Property::new("Amount", amount));
        if token.is_none() {
            overview = overview.with_banner(Banner::warning(UNKNOWN_TOKEN_WARNING));
        }
        let details = Screen::details("Approval details")
            .with_property(Property::new("Token contract", self.address(token_address)))
            .with_property(Property::new("Spender address", self.address(spender)))
            .with_property(self.network_property());

        Review::new(overview, self.confirm_screen("Confirm approval")).with_details(details)
    }

    fn nft_review(&self) -> Review {
        let (title, token_address, from, to, token_id, extra) = match self.classification {
            Classification::Erc721Transfer {
                token_address,
                from,
                to,
                token_id,
            } => ("Send NFT".to_string(), token_address, from, to, token_id, None),
            Classification::Erc1155Transfer {
                token_address,
                from,
                to,
                token_id,
                amount,
                extra_data,
            } => (
                format!("Send {} NFT", amount),
                token_address,
                from,
                to,
                token_id,
                Some(extra_data),
            ),
            _ => return self.blind_review(),
        };

        let overview = Screen::overview(title)
            .with_property(Property::new("Token ID", token_id.to_string()))
            .with_property(Property::new("To", self.address(to)));
        let mut details = Screen::details("NFT details")
            .with_property(Property::new("Contract", self.address(token_address)))
            .with_property(Property::new("From", self.address(from)))
            .with_property(self.network_property());
        if let Some(extra) = extra.filter(|e| !e.is_empty()) {
            details = details.with_property(Property::data("Data", format_hex(extra)));
        }

        Review::new(overview, self.confirm_screen("Sign transaction")).with_details(details)
    }

    fn safe_approve_hash_review(&self, safe_address: &[u8; 20], hash: &[u8; 32]) -> Review {
        let overview = Screen::details("Approve Safe transaction")
            .with_property(Property::new("Safe", self.address(safe_address)))
            .with_property(Property::data("Transaction hash", format_hex(hash)));
        Review::new(overview, self.confirm_screen("Sign transaction"))
    }

    fn safe_exec_review(&self, safe_address: &[u8; 20], call: &SafeExecCall) -> Review {
        let summary = SafeCallSummary {
            to: call.to,
            value: &call.value,
            operation: call.operation,
            data_length: call.data.len(),
            data: &call.data,
        };
        let overview = Screen::details("Execute Safe transaction")
            .with_property(Property::new("Safe", self.address(safe_address)))
            .with_properties(summary.properties(&self.network));
        let details = Screen::details("Safe transaction details")
            .with_property(Property::new("Safe tx gas", call.safe_tx_gas.to_string()))
            .with_property(Property::new("Base gas", call.base_gas.to_string()))
            .with_property(Property::new("Gas price", call.gas_price.to_string()))
            .with_property(Property::new("Gas token", self.address(&call.gas_token)))
            .with_property(Property::new(
                "Refund receiver",
                self.address(&call.refund_receiver),
            ))
            .with_property(Property::new(
                "Signatures",
                format!("{} bytes", call.signatures.len()),
            ));

        summary.decorate(
            Review::new(overview, self.confirm_screen("Sign transaction")).with_details(details),
        )
    }

    pub fn review(&self) -> Review {
        match self.classification {
            Classification::PlainTransfer | Classification::Unknown if self.needs_blind_signing() => {
                self.blind_review()
            }
            Classification::PlainTransfer | Classification::Unknown => self.plain_review(),
            Classification::Erc20Transfer {
                token_address,
                recipient,
                amount,
            } => self.token_transfer_review(token_address, recipient, amount),
            Classification::Erc20Approve {
                token_address,
                spender,
                value,
            } => self.approve_review(token_address, spender, value),
            Classification::Erc721Transfer { .. } | Classification::Erc1155Transfer { .. } => {
                self.nft_review()
            }
            Classification::SafeApproveHash { safe_address, hash } => {
                self.safe_approve_hash_review(safe_address, hash)
            }
            Classification::SafeExecTransaction { safe_address, call } => {
                self.safe_exec_review(safe_address, call)
            }
        }
    }
}

/// Walk the user through a transaction, enforcing the blind signing policy
pub async fn review_transaction<U>(
    ui: &U,
    settings: &DeviceSettings,
    review: &TxReview<'_>,
) -> Result<(), DeviceError>
where
    U: Ui + Sync + ?Sized,
{
    if review.needs_blind_signing() && !settings.blind_signing() {
        warn!("blind signing is disabled, refusing {:?}", review.classification.kind());
        return Err(DeviceError::PolicyRejected(
            "Blind signing is disabled".to_string(),
        ));
    }

    info!(
        "reviewing {:?} on chain {}",
        review.classification.kind(),
        review.network.chain_id
    );
    review.review().walk(ui, settings).await
}

/// Short description of a recognized call, used for nested Safe calls
pub fn describe_call(classification: &Classification, chain_id: u64) -> Option<String> {
    match classification {
        Classification::Erc20Transfer {
            token_address,
            amount,
            ..
        } => Some(match token_by_address(chain_id, token_address) {
            Some(token) => format!(
                "Send {}",
                format_token_amount(amount, token.decimals, token.symbol)
            ),
            None => format!("Send {}", format_token_amount(amount, 0, UNKNOWN_TOKEN_SYMBOL)),
        }),
        Classification::Erc20Approve {
            token_address,
            spender,
            value,
        } => Some(approve_title(
            ApproveAction::from_value(value),
            token_by_address(chain_id, token_address).map(|t| t.symbol),
            provider_by_address(chain_id, spender).map(|p| p.name),
        )),
        Classification::Erc721Transfer { .. } => Some("Send NFT".to_string()),
        Classification::Erc1155Transfer { amount, .. } => Some(format!("Send {} NFT", amount)),
        Classification::SafeApproveHash { .. } => Some("Approve Safe transaction".to_string()),
        Classification::SafeExecTransaction { .. } => Some("Execute Safe transaction".to_string()),
        Classification::PlainTransfer | Classification::Unknown => None,
    }
}

/// The call a Safe is asked to make
pub struct SafeCallSummary<'a> {
    pub to: [u8; 20],
    pub value: &'a BigUint,
    pub operation: u8,
    pub data_length: usize,
    /// Initial part of the call data
    pub data: &'a [u8],
}

impl SafeCallSummary<'_> {
    pub fn is_delegatecall(&self) -> bool {
        self.operation == 1
    }

    pub fn properties(&self, network: &NetworkInfo) -> Vec<Property> {
        let value = if self.value.is_zero() {
            Vec::new()
        } else {
            self.value.to_bytes_be()
        };
        let nested = classify(&self.to, &value, self.data_length as u32, self.data);
        let call = match describe_call(&nested, network.chain_id) {
            Some(description) => description,
            None if self.data_length == 0 => "None".to_string(),
            None => format!("Unknown data ({} bytes)", self.data_length),
        };
        let operation = if self.is_delegatecall() {
            "Delegatecall"
        } else {
            "Call"
        };

        vec![
            Property::new("To", checksum_address(&self.to, network.chain_id)),
            Property::new("Value", format_native_amount(self.value, network)),
            Property::new("Operation", operation),
            Property::new("Call", call),
        ]
    }

    /// Delegatecalls are shown in danger colors with a warning
    pub fn decorate(&self, review: Review) -> Review {
        if !self.is_delegatecall() {
            return review;
        }
        let mut review = review.with_accent(Accent::Danger);
        review.overview = review.overview.with_banner(Banner::danger(DELEGATECALL_WARNING));
        review
    }
}

/// Amount of a token with its decimals, used on typed data and Safe screens
pub fn token_amount_text(chain_id: u64, token_address: &[u8; 20], amount: &BigUint) -> String {
    match token_by_address(chain_id, token_address) {
        Some(token) => format_token_amount(amount, token.decimals, token.symbol),
        None => format!("{} {}", format_amount(amount, 0), UNKNOWN_TOKEN_SYMBOL),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::networks;
    use crate::test_utils::{address, RecordingUi};
    use evm_signer_device_base::{Interaction, ScreenKind};
    use futures::executor::block_on;

    #[test]
    fn test_approve_titles() {
        use ApproveAction::*;
        let cases = [
            (Revoke, Some("USDC"), Some("1inch"), "Revoke USDC from 1inch"),
            (Revoke, Some("USDC"), None, "Revoke USDC approval"),
            (Revoke, None, Some("1inch"), "Revoke token from 1inch"),
            (Revoke, None, None, "Revoke token approval"),
            (ApproveUnlimited, Some("USDC"), Some("1inch"), "Approve unlimited USDC for 1inch"),
            (ApproveUnlimited, Some("USDC"), None, "Approve unlimited USDC"),
            (ApproveUnlimited, None, Some("1inch"), "Approve unlimited token for 1inch"),
            (ApproveUnlimited, None, None, "Approve unlimited token"),
            (Approve, Some("USDC"), Some("1inch"), "Approve USDC for 1inch"),
            (Approve, Some("USDC"), None, "Approve USDC"),
            (Approve, None, Some("1inch"), "Approve token for 1inch"),
            (Approve, None, None, "Approve token"),
        ];
        for (action, token, provider, expected) in cases {
            assert_eq!(approve_title(action, token, provider), expected);
        }
    }

    #[test]
    fn test_approve_action() {
        assert_eq!(ApproveAction::from_value(&BigUint::zero()), ApproveAction::Revoke);
        assert_eq!(ApproveAction::from_value(&max_uint256()), ApproveAction::ApproveUnlimited);
        assert_eq!(ApproveAction::from_value(&BigUint::from(5u8)), ApproveAction::Approve);
    }

    fn review<'a>(classification: &'a Classification, data: &'a [u8]) -> TxReview<'a> {
        TxReview {
            network: networks::by_chain_id(1),
            to: Some([0x11; 20]),
            value: BigUint::zero(),
            classification,
            data_length: data.len() as u32,
            data_initial_chunk: data,
            fee: FeeSummary::legacy(&BigUint::from(20_000_000_000u64), &BigUint::from(21000u32)),
        }
    }

    #[test]
    fn test_fee_summary() {
        let fee = FeeSummary::eip1559(
            &BigUint::from(30_000_000_000u64),
            &BigUint::from(1_000_000_000u64),
            &BigUint::from(21000u32),
        );
        assert_eq!(fee.max_fee, BigUint::from(630_000_000_000_000u64));
        assert_eq!(fee.properties[0].value, "30 Gwei");
    }

    #[test]
    fn test_unknown_token_transfer() {
        let classification = Classification::Erc20Transfer {
            token_address: [0x11; 20],
            recipient: [0x22; 20],
            amount: BigUint::from(5u8),
        };
        let review = review(&classification, &[]).review();

        assert_eq!(review.overview.title, "Send 5 UNKN");
        assert!(review.overview.has_banner(UNKNOWN_TOKEN_WARNING));
    }

    #[test]
    fn test_details_are_optional() {
        let classification = Classification::PlainTransfer;
        let ui = RecordingUi::with_answers([Interaction::Details]);
        block_on(review_transaction(&ui, &DeviceSettings::default(), &review(&classification, &[])))
            .unwrap();
        assert_eq!(
            ui.titles(),
            vec!["Send 0 ETH", "Transaction details", "Sign transaction"]
        );

        let ui = RecordingUi::confirming();
        block_on(review_transaction(&ui, &DeviceSettings::default(), &review(&classification, &[])))
            .unwrap();
        assert_eq!(ui.titles(), vec!["Send 0 ETH", "Sign transaction"]);
    }

    #[test]
    fn test_blind_signing_policy() {
        let classification = Classification::PlainTransfer;
        let data = [0xde, 0xad, 0xbe, 0xef];
        let ui = RecordingUi::confirming();

        let result = block_on(review_transaction(
            &ui,
            &DeviceSettings::default(),
            &review(&classification, &data),
        ));
        assert!(matches!(result, Err(DeviceError::PolicyRejected(_))));
        assert!(ui.screens().is_empty());

        let settings = DeviceSettings::default().with_blind_signing(true);
        block_on(review_transaction(&ui, &settings, &review(&classification, &data))).unwrap();
        let screens = ui.screens();
        assert_eq!(screens[0].title, "View Data");
        assert_eq!(screens[0].property("Data"), Some("0xdeadbeef"));
        assert_eq!(screens[1].title, "Contract interaction");
        assert!(screens[1].has_banner(BLIND_SIGNING_WARNING));
    }

    #[test]
    fn test_turbo_mode_collapses() {
        let classification = Classification::Erc20Transfer {
            token_address: address("0xdAC17F958D2ee523a2206206994597C13D831ec7"),
            recipient: [0x22; 20],
            amount: BigUint::from(100_000_000u64),
        };
        let mut settings = DeviceSettings::default();
        block_on(settings.enable_turbo_mode(&RecordingUi::confirming())).unwrap();

        let ui = RecordingUi::confirming();
        block_on(review_transaction(&ui, &settings, &review(&classification, &[]))).unwrap();

        let screens = ui.screens();
        assert_eq!(screens.len(), 1);
        assert_eq!(screens[0].kind, ScreenKind::Confirm);
        assert_eq!(screens[0].title, "Send 100 USDT");
        assert!(screens[0].property("Token contract").is_some());
        assert!(screens[0].property("Max fees").is_some());
    }

    #[test]
    fn test_turbo_mode_keeps_subtitle_and_danger() {
        let mut settings = DeviceSettings::default();
        block_on(settings.enable_turbo_mode(&RecordingUi::confirming())).unwrap();

        let review = Review::new(
            Screen::overview("Execute Safe transaction").with_subtitle("Safe 0x3333"),
            Screen::confirm("Sign transaction").with_property(Property::new("Nonce", "7")),
        )
        .with_details(
            Screen::details("Call")
                .with_property(Property::new("To", "0x4444"))
                .with_accent(Accent::Danger),
        );
        let ui = RecordingUi::confirming();
        block_on(review.walk(&ui, &settings)).unwrap();

        let screens = ui.screens();
        assert_eq!(screens.len(), 1);
        assert_eq!(screens[0].title, "Execute Safe transaction");
        assert_eq!(screens[0].subtitle.as_deref(), Some("Safe 0x3333"));
        assert_eq!(screens[0].accent, Accent::Danger);
        assert!(screens[0].property("To").is_some());
        assert!(screens[0].property("Nonce").is_some());
    }

    #[test]
    fn test_reject_cancels() {
        let classification = Classification::PlainTransfer;
        let ui = RecordingUi::with_answers([Interaction::Confirm, Interaction::Reject]);
        assert_eq!(
            block_on(review_transaction(&ui, &DeviceSettings::default(), &review(&classification, &[]))),
            Err(DeviceError::Cancelled)
        );
    }

    #[test]
    fn test_delegatecall_decoration() {
        let value = BigUint::zero();
        let summary = SafeCallSummary {
            to: [0x33; 20],
            value: &value,
            operation: 1,
            data_length: 0,
            data: &[],
        };
        let review = summary.decorate(Review::new(Screen::overview("a"), Screen::confirm("b")));

        assert_eq!(review.overview.accent, Accent::Danger);
        assert_eq!(review.confirm.accent, Accent::Danger);
        assert!(review.overview.has_banner(DELEGATECALL_WARNING));
        assert_eq!(
            summary.properties(&networks::by_chain_id(1))[2].value,
            "Delegatecall"
        );
    }
}
