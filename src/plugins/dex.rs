// src/plugins/dex.rs
//
// UniswapV2-style DEX tools. Pair state is read through simulated
// calls against the factory and pair contracts; quotes use the
// constant-product formula locally so they work with only a factory
// address configured. Swaps go through the router with an approve
// clause in the same transaction; a native VET leg uses the router's
// payable entrypoints with the amount carried as clause value.

use std::str::FromStr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, bail, Context, Result};
use ethers_core::abi::Token as AbiToken;
use ethers_core::types::{Address, U256};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::plugin::Plugin;
use crate::core::registration::ToolRegistration;
use crate::core::schema::{NoParameters, ToolParameters};
use crate::core::types::{Chain, TransactionClause};
use crate::core::wallet::ContractReader;
use crate::plugins::read_address;
use crate::plugins::token::token_decimals;
use crate::registry::abi;
use crate::registry::dex::{active_dexes, find_dex, ResolvedDex};
use crate::registry::networks::Network;
use crate::registry::tokens::resolve_token;
use crate::utils::{format_fixed, parse_token_amount};

/// Swap transactions expire ten minutes after they are built.
const SWAP_DEADLINE_SECS: u64 = 600;

/// Price impact above this many basis points is flagged in quotes.
const HIGH_IMPACT_BPS: u64 = 1_500;

#[derive(Debug, Deserialize)]
pub struct PairReservesParameters {
    pub dex_name: String,
    pub token_a: String,
    pub token_b: String,
}

impl ToolParameters for PairReservesParameters {
    fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "dex_name": {
                    "type": "string",
                    "description": "DEX to query (e.g. \"veswap\")"
                },
                "token_a": {
                    "type": "string",
                    "description": "First token symbol or contract address"
                },
                "token_b": {
                    "type": "string",
                    "description": "Second token symbol or contract address"
                }
            },
            "required": ["dex_name", "token_a", "token_b"]
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SwapQuoteParameters {
    pub dex_name: String,
    pub from_token: String,
    pub to_token: String,
    pub amount_in: String,
}

impl ToolParameters for SwapQuoteParameters {
    fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "dex_name": {
                    "type": "string",
                    "description": "DEX to quote against (e.g. \"veswap\")"
                },
                "from_token": {
                    "type": "string",
                    "description": "Token to sell, symbol or contract address"
                },
                "to_token": {
                    "type": "string",
                    "description": "Token to buy, symbol or contract address"
                },
                "amount_in": {
                    "type": "string",
                    "description": "Amount to sell in token units (e.g. \"100\")"
                }
            },
            "required": ["dex_name", "from_token", "to_token", "amount_in"]
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ExecuteSwapParameters {
    pub dex_name: String,
    pub from_token: String,
    pub to_token: String,
    pub amount_in: String,
    pub amount_out_min: String,
}

impl ToolParameters for ExecuteSwapParameters {
    fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "dex_name": {
                    "type": "string",
                    "description": "DEX to trade on (e.g. \"veswap\")"
                },
                "from_token": {
                    "type": "string",
                    "description": "Token to sell, symbol or contract address"
                },
                "to_token": {
                    "type": "string",
                    "description": "Token to buy, symbol or contract address"
                },
                "amount_in": {
                    "type": "string",
                    "description": "Amount to sell in token units"
                },
                "amount_out_min": {
                    "type": "string",
                    "description": "Minimum acceptable amount to receive (slippage bound)"
                }
            },
            "required": ["dex_name", "from_token", "to_token", "amount_in", "amount_out_min"]
        })
    }
}

/// Tools for querying and trading on VeChain DEXes.
pub struct DexPlugin<W: ContractReader> {
    registrations: Vec<ToolRegistration<W>>,
}

impl<W: ContractReader> DexPlugin<W> {
    pub fn new(network: Network) -> Self {
        let registrations = vec![
            {
                let network = network.clone();
                ToolRegistration::plain(
                    "dex_get_available_dexes",
                    "List DEXes known on the current network",
                    move |_params: NoParameters| {
                        let network = network.clone();
                        async move { list_dexes(&network) }
                    },
                )
            },
            {
                let network = network.clone();
                ToolRegistration::with_wallet(
                    "dex_get_pair_reserves",
                    "Get the liquidity reserves of a token pair",
                    move |wallet: Arc<W>, params: PairReservesParameters| {
                        get_pair_reserves(wallet, network.clone(), params)
                    },
                )
            },
            {
                let network = network.clone();
                ToolRegistration::with_wallet(
                    "dex_get_swap_quote",
                    "Quote a token swap, including price impact",
                    move |wallet: Arc<W>, params: SwapQuoteParameters| {
                        get_swap_quote(wallet, network.clone(), params)
                    },
                )
            },
            {
                let network = network.clone();
                ToolRegistration::with_wallet(
                    "dex_execute_swap",
                    "Execute a token swap through the DEX router",
                    move |wallet: Arc<W>, params: ExecuteSwapParameters| {
                        execute_swap(wallet, network.clone(), params)
                    },
                )
            },
        ];
        Self { registrations }
    }
}

impl<W: ContractReader> Plugin<W> for DexPlugin<W> {
    fn name(&self) -> &str {
        "dex"
    }

    fn supports_chain(&self, chain: &Chain) -> bool {
        chain.chain_type == "vechain"
    }

    fn registrations(&self) -> &[ToolRegistration<W>] {
        &self.registrations
    }
}

fn list_dexes(network: &Network) -> Result<Value> {
    let dexes: Vec<Value> = active_dexes(network.name)
        .into_iter()
        .map(|dex| {
            json!({
                "name": dex.entry.name,
                "displayName": dex.entry.display_name,
                "description": dex.entry.description,
                "website": dex.entry.website,
                "version": dex.entry.version,
                "fee": format_fee(dex.entry.fee_bps),
                "configured": dex.router.is_some() || dex.factory.is_some(),
                "router": dex.router,
                "factory": dex.factory,
            })
        })
        .collect();

    Ok(json!({
        "network": network.name,
        "count": dexes.len(),
        "dexes": dexes,
    }))
}

async fn get_pair_reserves<W: ContractReader>(
    wallet: Arc<W>,
    network: Network,
    params: PairReservesParameters,
) -> Result<Value> {
    let dex = lookup_dex(&params.dex_name, &network)?;
    let factory = factory_address(&dex, &network)?;
    let token_a = resolve_dex_token(wallet.as_ref(), &params.token_a, &network).await?;
    let token_b = resolve_dex_token(wallet.as_ref(), &params.token_b, &network).await?;

    let pair = locate_pair(wallet.as_ref(), &factory, &token_a, &token_b).await?;

    let reserve_a = format_fixed(pair.reserve_in, token_a.decimals, 4)?;
    let reserve_b = format_fixed(pair.reserve_out, token_b.decimals, 4)?;
    let a_value: f64 = reserve_a.parse().unwrap_or(0.0);
    let b_value: f64 = reserve_b.parse().unwrap_or(0.0);
    let price = if a_value > 0.0 { b_value / a_value } else { 0.0 };

    Ok(json!({
        "dex": dex.entry.display_name,
        "pair": pair.address,
        "tokenA": {
            "symbol": token_a.symbol,
            "address": token_a.address_hex,
            "reserve": reserve_a,
            "reserveRaw": pair.reserve_in.to_string(),
        },
        "tokenB": {
            "symbol": token_b.symbol,
            "address": token_b.address_hex,
            "reserve": reserve_b,
            "reserveRaw": pair.reserve_out.to_string(),
        },
        "price": format!("{:.8}", price),
        "priceDescription": format!("1 {} = {:.8} {}", token_a.symbol, price, token_b.symbol),
    }))
}

async fn get_swap_quote<W: ContractReader>(
    wallet: Arc<W>,
    network: Network,
    params: SwapQuoteParameters,
) -> Result<Value> {
    let dex = lookup_dex(&params.dex_name, &network)?;
    let factory = factory_address(&dex, &network)?;
    let from = resolve_dex_token(wallet.as_ref(), &params.from_token, &network).await?;
    let to = resolve_dex_token(wallet.as_ref(), &params.to_token, &network).await?;

    let amount_in = parse_token_amount(&params.amount_in, from.decimals)?;
    let pair = locate_pair(wallet.as_ref(), &factory, &from, &to).await?;

    let out = amount_out(pair.reserve_in, pair.reserve_out, amount_in, dex.entry.fee_bps)?;
    let impact_bps = price_impact_bps(pair.reserve_in, amount_in)?;

    let mut quote = json!({
        "dex": dex.entry.display_name,
        "pair": pair.address,
        "from": {
            "symbol": from.symbol,
            "amount": params.amount_in,
            "raw": amount_in.to_string(),
        },
        "to": {
            "symbol": to.symbol,
            "amount": format_fixed(out, to.decimals, 6)?,
            "raw": out.to_string(),
        },
        "priceImpact": format_price_impact(impact_bps),
        "fee": format_fee(dex.entry.fee_bps),
    });
    if impact_bps > HIGH_IMPACT_BPS {
        quote["warning"] =
            json!("High price impact; consider splitting this trade into smaller amounts");
    }
    Ok(quote)
}

async fn execute_swap<W: ContractReader>(
    wallet: Arc<W>,
    network: Network,
    params: ExecuteSwapParameters,
) -> Result<Value> {
    let dex = lookup_dex(&params.dex_name, &network)?;
    let router_hex = router_address(&dex, &network)?;
    let from = resolve_dex_token(wallet.as_ref(), &params.from_token, &network).await?;
    let to = resolve_dex_token(wallet.as_ref(), &params.to_token, &network).await?;
    if from.native && to.native {
        bail!("Cannot swap VET for VET");
    }

    let amount_in = parse_token_amount(&params.amount_in, from.decimals)?;
    let amount_out_min = parse_token_amount(&params.amount_out_min, to.decimals)?;
    let recipient = Address::from_str(&wallet.get_address())?;
    let deadline = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("System clock is before the Unix epoch")?
        .as_secs()
        + SWAP_DEADLINE_SECS;

    let clauses = swap_clauses(
        &router_hex,
        &from,
        &to,
        amount_in,
        amount_out_min,
        recipient,
        deadline,
    )?;
    let result = wallet.send_transaction(clauses).await?;
    let explorer = network.explorer_tx_url(&result.hash);
    Ok(json!({
        "success": true,
        "txHash": result.hash,
        "txId": result.id,
        "dex": dex.entry.display_name,
        "from": { "symbol": from.symbol, "amount": params.amount_in },
        "to": { "symbol": to.symbol, "minimum": params.amount_out_min },
        "explorer": explorer,
        "message": format!(
            "Swap submitted: {} {} for at least {} {} on {}",
            params.amount_in, from.symbol, params.amount_out_min, to.symbol,
            dex.entry.display_name
        ),
    }))
}

/// Builds the clause list for a swap: an approve on the input token
/// (skipped when selling VET, which needs no allowance) followed by
/// the router call. The entrypoint mirrors UniswapV2's:
/// `swapExactETHForTokens` when VET goes in (amount as clause value),
/// `swapExactTokensForETH` when VET comes out, `swapExactTokensForTokens`
/// otherwise.
fn swap_clauses(
    router_hex: &str,
    from: &DexToken,
    to: &DexToken,
    amount_in: U256,
    amount_out_min: U256,
    recipient: Address,
    deadline: u64,
) -> Result<Vec<TransactionClause>> {
    let router = Address::from_str(router_hex)?;
    let path = AbiToken::Array(vec![
        AbiToken::Address(from.address),
        AbiToken::Address(to.address),
    ]);

    let mut clauses = Vec::with_capacity(2);
    if from.native {
        clauses.push(TransactionClause::contract_call_with_value(
            router_hex,
            abi::encode_call(
                "swapExactETHForTokens(uint256,address[],address,uint256)",
                &[
                    AbiToken::Uint(amount_out_min),
                    path,
                    AbiToken::Address(recipient),
                    AbiToken::Uint(U256::from(deadline)),
                ],
            ),
            amount_in,
        ));
    } else {
        clauses.push(TransactionClause::contract_call(
            &from.address_hex,
            abi::encode_call(
                "approve(address,uint256)",
                &[AbiToken::Address(router), AbiToken::Uint(amount_in)],
            ),
        ));
        let entrypoint = if to.native {
            "swapExactTokensForETH(uint256,uint256,address[],address,uint256)"
        } else {
            "swapExactTokensForTokens(uint256,uint256,address[],address,uint256)"
        };
        clauses.push(TransactionClause::contract_call(
            router_hex,
            abi::encode_call(
                entrypoint,
                &[
                    AbiToken::Uint(amount_in),
                    AbiToken::Uint(amount_out_min),
                    path,
                    AbiToken::Address(recipient),
                    AbiToken::Uint(U256::from(deadline)),
                ],
            ),
        ));
    }
    Ok(clauses)
}

struct DexToken {
    symbol: String,
    address: Address,
    address_hex: String,
    decimals: u32,
    native: bool,
}

async fn resolve_dex_token<W: ContractReader>(
    wallet: &W,
    token: &str,
    network: &Network,
) -> Result<DexToken> {
    let resolved = resolve_token(token, network.name)?;
    if resolved.native {
        // VET has no contract of its own. Routers take it through their
        // payable entrypoints; the zero address stands in on the path.
        return Ok(DexToken {
            symbol: resolved.symbol,
            address: Address::zero(),
            address_hex: format!("0x{:x}", Address::zero()),
            decimals: resolved.decimals.unwrap_or(18),
            native: true,
        });
    }
    let address_hex = resolved.address.clone().ok_or_else(|| {
        anyhow!(
            "Token {} is not deployed on {}",
            resolved.symbol,
            network.display_name
        )
    })?;
    let decimals = token_decimals(wallet, &resolved, &address_hex).await?;
    Ok(DexToken {
        symbol: resolved.symbol,
        address: Address::from_str(&address_hex)?,
        address_hex,
        decimals,
        native: false,
    })
}

/// A located pair with reserves oriented to the caller's token order:
/// `reserve_in` belongs to the first token passed to `locate_pair`.
struct PairState {
    address: String,
    reserve_in: U256,
    reserve_out: U256,
}

async fn locate_pair<W: ContractReader>(
    wallet: &W,
    factory: &str,
    token_in: &DexToken,
    token_out: &DexToken,
) -> Result<PairState> {
    let pair = read_address(
        wallet,
        factory,
        "getPair(address,address)",
        &[
            AbiToken::Address(token_in.address),
            AbiToken::Address(token_out.address),
        ],
    )
    .await?;
    if pair.is_zero() {
        bail!(
            "No liquidity pair for {}/{} on this DEX",
            token_in.symbol,
            token_out.symbol
        );
    }

    let address = format!("0x{:x}", pair);
    let token0 = read_address(wallet, &address, "token0()", &[]).await?;
    let output = wallet
        .execute_call(&address, abi::encode_call("getReserves()", &[]))
        .await?;
    let (reserve0, reserve1) = abi::decode_reserves(&output)?;

    let (reserve_in, reserve_out) = if token0 == token_in.address {
        (reserve0, reserve1)
    } else {
        (reserve1, reserve0)
    };
    Ok(PairState {
        address,
        reserve_in,
        reserve_out,
    })
}

fn lookup_dex(name: &str, network: &Network) -> Result<ResolvedDex> {
    find_dex(name, network.name).ok_or_else(|| {
        let names: Vec<&str> = active_dexes(network.name)
            .iter()
            .map(|dex| dex.entry.name)
            .collect();
        anyhow!("Unknown DEX {:?}. Available: {}", name, names.join(", "))
    })
}

fn factory_address(dex: &ResolvedDex, network: &Network) -> Result<String> {
    dex.factory.clone().ok_or_else(|| {
        anyhow!(
            "{} has no factory configured for {}; set {}",
            dex.entry.display_name,
            network.name,
            dex.entry.factory_env(network.name)
        )
    })
}

fn router_address(dex: &ResolvedDex, network: &Network) -> Result<String> {
    dex.router.clone().ok_or_else(|| {
        anyhow!(
            "{} has no router configured for {}; set {}",
            dex.entry.display_name,
            network.name,
            dex.entry.router_env(network.name)
        )
    })
}

/// Constant-product output amount with the fee taken from the input
/// side, in basis points. Mirrors UniswapV2's getAmountOut.
pub(crate) fn amount_out(
    reserve_in: U256,
    reserve_out: U256,
    amount_in: U256,
    fee_bps: u32,
) -> Result<U256> {
    if reserve_in.is_zero() || reserve_out.is_zero() {
        bail!("Pair has no liquidity");
    }
    if amount_in.is_zero() {
        bail!("Swap amount must be positive");
    }

    let fee_factor = U256::from(10_000u64 - u64::from(fee_bps));
    let in_eff = amount_in
        .checked_mul(fee_factor)
        .ok_or_else(|| anyhow!("Swap amount too large"))?;
    let numerator = in_eff
        .checked_mul(reserve_out)
        .ok_or_else(|| anyhow!("Swap amount too large"))?;
    let denominator = reserve_in
        .checked_mul(U256::from(10_000u64))
        .and_then(|scaled| scaled.checked_add(in_eff))
        .ok_or_else(|| anyhow!("Swap amount too large"))?;
    Ok(numerator / denominator)
}

/// Share of the input-side reserve this trade consumes, in basis
/// points.
pub(crate) fn price_impact_bps(reserve_in: U256, amount_in: U256) -> Result<u64> {
    let denominator = reserve_in
        .checked_add(amount_in)
        .ok_or_else(|| anyhow!("Swap amount too large"))?;
    if denominator.is_zero() {
        bail!("Pair has no liquidity");
    }
    let scaled = amount_in
        .checked_mul(U256::from(10_000u64))
        .ok_or_else(|| anyhow!("Swap amount too large"))?;
    Ok((scaled / denominator).low_u64())
}

fn format_price_impact(bps: u64) -> String {
    if bps == 0 {
        "<0.01%".to_string()
    } else {
        format!("{:.2}%", bps as f64 / 100.0)
    }
}

fn format_fee(fee_bps: u32) -> String {
    format!("{:.2}%", f64::from(fee_bps) / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_out_takes_the_fee_from_the_input() {
        let out = amount_out(
            U256::from(1_000u64),
            U256::from(1_000u64),
            U256::from(100u64),
            30,
        )
        .unwrap();
        assert_eq!(out, U256::from(90u64));

        let no_fee = amount_out(
            U256::from(1_000u64),
            U256::from(2_000u64),
            U256::from(100u64),
            0,
        )
        .unwrap();
        assert_eq!(no_fee, U256::from(181u64));
    }

    #[test]
    fn amount_out_rejects_empty_pairs_and_zero_input() {
        assert!(amount_out(U256::zero(), U256::from(1u64), U256::from(1u64), 30).is_err());
        assert!(amount_out(U256::from(1u64), U256::zero(), U256::from(1u64), 30).is_err());
        assert!(amount_out(U256::from(1u64), U256::from(1u64), U256::zero(), 30).is_err());
    }

    #[test]
    fn price_impact_in_basis_points() {
        // 100 into a 1000 reserve: 100/1100 = 9.09%
        let bps = price_impact_bps(U256::from(1_000u64), U256::from(100u64)).unwrap();
        assert_eq!(bps, 909);
        assert_eq!(format_price_impact(bps), "9.09%");

        // dust trades read as below measurement resolution
        let dust = price_impact_bps(U256::from(10_000_000u64), U256::from(1u64)).unwrap();
        assert_eq!(format_price_impact(dust), "<0.01%");
    }

    #[test]
    fn fee_formatting() {
        assert_eq!(format_fee(30), "0.30%");
        assert_eq!(format_fee(25), "0.25%");
    }

    const ROUTER: &str = "0xabc0000000000000000000000000000000000def";
    const B3TR: &str = "0xbf64cf86894ee0877c4e7d03936e35ee8d8b864f";

    fn token(symbol: &str, address_hex: &str, native: bool) -> DexToken {
        DexToken {
            symbol: symbol.to_string(),
            address: Address::from_str(address_hex).unwrap(),
            address_hex: address_hex.to_string(),
            decimals: 18,
            native,
        }
    }

    fn vet() -> DexToken {
        token("VET", "0x0000000000000000000000000000000000000000", true)
    }

    fn build(from: &DexToken, to: &DexToken) -> Vec<TransactionClause> {
        let recipient =
            Address::from_str("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266").unwrap();
        swap_clauses(
            ROUTER,
            from,
            to,
            U256::exp10(18),
            U256::from(90u64),
            recipient,
            1_700_000_600,
        )
        .unwrap()
    }

    fn selector_hex(signature: &str) -> String {
        format!("0x{}", hex::encode(abi::selector(signature)))
    }

    #[test]
    fn vet_input_rides_as_clause_value() {
        let clauses = build(&vet(), &token("B3TR", B3TR, false));

        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses[0].to.as_deref(), Some(ROUTER));
        assert_eq!(clauses[0].value, "0xde0b6b3a7640000");
        assert!(clauses[0].data.starts_with(&selector_hex(
            "swapExactETHForTokens(uint256,address[],address,uint256)"
        )));
    }

    #[test]
    fn vet_output_goes_through_the_eth_exit() {
        let clauses = build(&token("B3TR", B3TR, false), &vet());

        assert_eq!(clauses.len(), 2);
        assert_eq!(clauses[0].to.as_deref(), Some(B3TR));
        assert!(clauses[0]
            .data
            .starts_with(&selector_hex("approve(address,uint256)")));
        assert_eq!(clauses[1].value, "0x0");
        assert!(clauses[1].data.starts_with(&selector_hex(
            "swapExactTokensForETH(uint256,uint256,address[],address,uint256)"
        )));
    }

    #[test]
    fn token_swaps_approve_then_call_the_router() {
        let vtho = token("VTHO", "0x0000000000000000000000000000456e65726779", false);
        let clauses = build(&vtho, &token("B3TR", B3TR, false));

        assert_eq!(clauses.len(), 2);
        assert_eq!(clauses[1].to.as_deref(), Some(ROUTER));
        assert!(clauses[1].data.starts_with(&selector_hex(
            "swapExactTokensForTokens(uint256,uint256,address[],address,uint256)"
        )));
    }
}
