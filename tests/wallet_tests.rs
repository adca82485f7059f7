//! Tests for the Thor-backed wallet: balance reads, transaction
//! signing and submission, and simulated contract calls, all against a
//! mock Thor node.

use ethers_core::types::U256;
use mockito::Matcher;
use serde_json::json;

use vechain_mcp_server::core::types::TransactionClause;
use vechain_mcp_server::core::wallet::{ContractReader, WalletClient};
use vechain_mcp_server::registry::abi;
use vechain_mcp_server::registry::networks::TESTNET;
use vechain_mcp_server::wallet::signer::WalletSigner;
use vechain_mcp_server::wallet::thor::ThorClient;
use vechain_mcp_server::wallet::VeChainWallet;

const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

fn test_wallet() -> VeChainWallet {
    VeChainWallet::with_thor(
        WalletSigner::from_private_key(TEST_KEY).unwrap(),
        ThorClient::new(&mockito::server_url()),
        TESTNET,
    )
}

fn best_block_mock() -> mockito::Mock {
    mockito::mock("GET", "/blocks/best")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": "0x00001234aabbccdd00000000000000000000000000000000000000000000cafe",
                "number": 4660
            })
            .to_string(),
        )
        .create()
}

fn simulation_mock(recipient: &str, body: serde_json::Value) -> mockito::Mock {
    mockito::mock("POST", "/accounts/*")
        .match_body(Matcher::PartialJson(json!({
            "clauses": [{ "to": recipient }]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create()
}

#[tokio::test]
async fn balance_reads_format_vet_and_vtho() {
    let address = "0x7567d83b7b8d80addcb281a71d54fc7b3364ffed";
    let _account = mockito::mock("GET", format!("/accounts/{}", address).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "balance": "0xde0b6b3a7640000",
                "energy": "0x1bc16d674ec80000",
                "hasCode": false
            })
            .to_string(),
        )
        .create();

    let balance = test_wallet().balance_of(address).await.unwrap();
    assert_eq!(balance.vet, "1.0000");
    assert_eq!(balance.vtho, "2.0000");
    assert_eq!(balance.raw.vet, "1000000000000000000");
    assert_eq!(balance.raw.vtho, "2000000000000000000");
}

#[tokio::test]
async fn thor_errors_carry_the_status() {
    let address = "0x0000000000000000000000000000000000000001";
    let _account = mockito::mock("GET", format!("/accounts/{}", address).as_str())
        .with_status(500)
        .with_body("boom")
        .create();

    let err = test_wallet().balance_of(address).await.unwrap_err();
    assert!(err.to_string().contains("500"), "got: {}", err);
}

#[tokio::test]
async fn send_transaction_signs_and_submits() {
    let recipient = "0x7567d83b7b8d80addcb281a71d54fc7b3364ffed";
    let _best = best_block_mock();
    let _sim = simulation_mock(
        recipient,
        json!([{ "data": "0x", "gasUsed": 0, "reverted": false, "vmError": "" }]),
    );
    // the raw hex embeds the recipient address, which pins this mock to
    // this test on the shared mock server
    let submit = mockito::mock("POST", "/transactions")
        .match_body(Matcher::Regex(format!(
            "\"raw\":\"0x[0-9a-f]*{}[0-9a-f]*\"",
            recipient.trim_start_matches("0x")
        )))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "id": "0xfeedbeef" }).to_string())
        .create();

    let clause = TransactionClause::vet_transfer(recipient, U256::exp10(18));
    let result = test_wallet().send_transaction(vec![clause]).await.unwrap();

    assert_eq!(result.hash, "0xfeedbeef");
    assert_eq!(result.id, "0xfeedbeef");
    submit.assert();
}

#[tokio::test]
async fn reverted_simulation_aborts_the_send() {
    let recipient = "0x0000000000000000000000000000456e65726779";
    let _best = best_block_mock();
    let _sim = simulation_mock(
        recipient,
        json!([{
            "data": "0x",
            "gasUsed": 423,
            "reverted": true,
            "vmError": "insufficient energy"
        }]),
    );

    let clause = TransactionClause::contract_call(recipient, vec![0xa9, 0x05, 0x9c, 0xbb]);
    let err = test_wallet()
        .send_transaction(vec![clause])
        .await
        .unwrap_err();
    assert!(
        err.to_string().contains("insufficient energy"),
        "got: {}",
        err
    );
}

#[tokio::test]
async fn rejected_submission_surfaces_the_node_reason() {
    let recipient = "0x1111111111111111111111111111111111111111";
    let _best = best_block_mock();
    let _sim = simulation_mock(
        recipient,
        json!([{ "data": "0x", "gasUsed": 0, "reverted": false, "vmError": "" }]),
    );
    let _submit = mockito::mock("POST", "/transactions")
        .match_body(Matcher::Regex(format!(
            "\"raw\":\"0x[0-9a-f]*{}[0-9a-f]*\"",
            recipient.trim_start_matches("0x")
        )))
        .with_status(400)
        .with_body("bad tx: intrinsic gas exceeds provided gas\n")
        .create();

    let clause = TransactionClause::vet_transfer(recipient, U256::from(1u64));
    let err = test_wallet()
        .send_transaction(vec![clause])
        .await
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Transaction rejected by Thor"), "got: {}", message);
    assert!(message.contains("intrinsic gas"), "got: {}", message);
}

#[tokio::test]
async fn execute_call_returns_simulation_output() {
    let contract = "0xbf64cf86894ee0877c4e7d03936e35ee8d8b864f";
    let mut word = [0u8; 32];
    word[31] = 42;
    let _sim = simulation_mock(
        contract,
        json!([{
            "data": format!("0x{}", hex::encode(word)),
            "gasUsed": 591,
            "reverted": false,
            "vmError": ""
        }]),
    );

    let output = test_wallet()
        .execute_call(contract, abi::encode_call("decimals()", &[]))
        .await
        .unwrap();
    assert_eq!(abi::decode_u256(&output).unwrap(), U256::from(42u64));
}

#[tokio::test]
async fn execute_call_rejects_reverts() {
    let contract = "0x2222222222222222222222222222222222222222";
    let _sim = simulation_mock(
        contract,
        json!([{ "data": "0x", "gasUsed": 100, "reverted": true, "vmError": "" }]),
    );

    let err = test_wallet()
        .execute_call(contract, abi::encode_call("name()", &[]))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("unknown VM error"), "got: {}", err);
}

#[tokio::test]
async fn empty_clause_lists_are_rejected_locally() {
    // no mocks: the wallet must fail before talking to Thor
    let err = test_wallet().send_transaction(vec![]).await.unwrap_err();
    assert!(
        err.to_string().contains("at least one clause"),
        "got: {}",
        err
    );
}
