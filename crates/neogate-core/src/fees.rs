//! GAS cost estimation from dry runs.

use tracing::debug;

use crate::contracts::params::marshal_args;
use crate::error::NeoError;
use crate::rpc::ContractCall;
use crate::service::NeoService;
use crate::types::{FeeEstimate, GasAmount, InvocationResult};
use crate::validation::{validate_address, validate_operation, validate_script_hash, AmountInput};

const BPS_DENOMINATOR: u128 = 10_000;

/// Scale `consumed` by `margin_bps` basis points, rounding up. The result is
/// always strictly greater than `consumed`; fails when no such amount fits.
pub fn apply_margin(consumed: GasAmount, margin_bps: u32) -> Result<GasAmount, NeoError> {
    let floor = consumed.0.checked_add(1).ok_or_else(|| {
        NeoError::Internal(format!("no GAS amount above {consumed} is representable"))
    })?;
    let scaled = (u128::from(consumed.0) * u128::from(margin_bps)).div_ceil(BPS_DENOMINATOR);
    let scaled = u64::try_from(scaled).unwrap_or(u64::MAX);
    Ok(GasAmount(scaled.max(floor)))
}

/// Dry-runs transfers and invocations and reports what they would cost.
/// Estimates are never cached.
pub struct FeeEstimator<'a> {
    service: &'a NeoService,
    margin_bps: u32,
}

impl<'a> FeeEstimator<'a> {
    /// Uses the service's configured margin.
    pub fn new(service: &'a NeoService) -> Result<Self, NeoError> {
        Self::with_margin(service, service.config().fee_margin_bps)
    }

    pub fn with_margin(service: &'a NeoService, margin_bps: u32) -> Result<Self, NeoError> {
        if u128::from(margin_bps) <= BPS_DENOMINATOR {
            return Err(NeoError::validation(format!(
                "fee margin must exceed 10000 bps, got {margin_bps}"
            )));
        }
        Ok(Self { service, margin_bps })
    }

    pub async fn estimate_transfer(
        &self,
        from: &str,
        to: &str,
        asset: &str,
        amount: &AmountInput,
    ) -> Result<FeeEstimate, NeoError> {
        let from = validate_address(from)?;
        let (to, asset, amount) = self.service.validate_transfer(to, asset, amount).await?;
        let call = crate::service::transfer_call(&from.script_hash(), &to, &asset, amount.units());
        let result = self.service.dry_run(&call).await?;
        self.finish(&call, &result)
    }

    pub async fn estimate_invocation(
        &self,
        signer: &str,
        script_hash: &str,
        operation: &str,
        args: &[serde_json::Value],
    ) -> Result<FeeEstimate, NeoError> {
        let signer = validate_address(signer)?;
        let script_hash = validate_script_hash(script_hash)?;
        let operation = validate_operation(operation)?;
        let params = marshal_args(&[], args)?;

        let call = ContractCall::new(script_hash, operation)
            .with_params(params)
            .with_signer(signer.script_hash());
        let result = self.service.dry_run(&call).await?;
        self.finish(&call, &result)
    }

    fn finish(
        &self,
        call: &ContractCall,
        result: &InvocationResult,
    ) -> Result<FeeEstimate, NeoError> {
        let estimate = FeeEstimate {
            estimated_gas: apply_margin(result.gas_consumed, self.margin_bps)?,
            min_required: result.gas_consumed,
            network: self.service.network(),
        };
        debug!(
            network = %estimate.network,
            contract = %call.script_hash,
            operation = %call.operation,
            consumed = %estimate.min_required,
            estimated = %estimate.estimated_gas,
            "fee estimate"
        );
        Ok(estimate)
    }
}
