//! Global mint reimbursement request.
//!
//! Global mint creates value out of thin air for the operator. To keep the
//! consumer from getting that for free, the same amount is taken from the
//! consumer's escrowed stake, moved to the treasury, and a reimbursement
//! request event is emitted so the consumer can be made whole off-chain.

use tracing::info;

use relaysettle_types::{
    ModToAcctTransfer, ModToModTransfer, ModuleAccount, Result, SettlementEvent,
    SettlementOpReason, TlmId,
};

use super::global_mint::{enabled_params, global_inflation_amount};
use super::{TlmContext, TlmOutput, TokenLogicModule};

#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalMintReimbursementRequest;

impl TokenLogicModule for GlobalMintReimbursementRequest {
    fn id(&self) -> TlmId {
        TlmId::GlobalMintReimbursementRequest
    }

    fn process(&self, ctx: &TlmContext<'_>) -> Result<TlmOutput> {
        let tlm = self.id();
        let (inflation_rate, _) = enabled_params(tlm, &ctx.params.global_mint)?;
        let mut out = TlmOutput::new();

        let amount = global_inflation_amount(ctx.settlement_coin.amount, inflation_rate)?;
        if amount == 0 {
            return Ok(out);
        }
        let coin = ctx.coin(amount);

        out.consumer_stake_debit = amount;

        out.mod_to_mod_transfers.push(ModToModTransfer {
            reason: SettlementOpReason::GlobalMintReimbursementRequestEscrowModuleTransfer,
            sender: ModuleAccount::Application,
            recipient: ModuleAccount::Tokenomics,
            coin: coin.clone(),
        });
        out.mod_to_acct_transfers.push(ModToAcctTransfer {
            reason: SettlementOpReason::GlobalMintReimbursementRequestEscrowTreasuryTransfer,
            sender: ModuleAccount::Tokenomics,
            recipient: ctx.params.treasury_address.clone(),
            coin: coin.clone(),
        });
        info!(
            tlm = %tlm,
            session_id = %ctx.claim.session_id,
            application = %ctx.claim.application,
            treasury = %ctx.params.treasury_address,
            amount,
            "operation queued: reimbursement escrow to treasury"
        );

        out.events.push(SettlementEvent::ReimbursementRequested {
            consumer: ctx.claim.application.clone(),
            operator: ctx.claim.supplier_operator.clone(),
            service_id: ctx.claim.service_id.clone(),
            session_id: ctx.claim.session_id.clone(),
            amount: coin,
        });

        Ok(out)
    }
}
