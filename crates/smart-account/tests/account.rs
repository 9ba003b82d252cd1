//! Tests for the execution gateway of the smart account.

use alloy_primitives::{address, b256, Address, Bytes, B256, U256};
use alloy_sol_types::{SolCall, SolEvent};
use smart_account::{
    contracts::ISmartAccount,
    test_utils::{Counter, ICounter, SelfCaller, TestEnv, TestSigner, ENTRY_POINT},
    AccountError, AccountHandle, ClientError, ExecutionResult, Revert, TxEnv,
};

const COUNTER: Address = address!("c0c0000000000000000000000000000000000001");
const STRANGER: Address = address!("0000000000000000000000000000000000005555");
const SALT: B256 = b256!("0000000000000000000000000000000000000000000000000000000000000042");

fn setup() -> (TestEnv, AccountHandle) {
    let mut env = TestEnv::default();
    env.host.set_code(COUNTER, Counter.into_code());
    let account = env.create_funded_account(SALT, U256::from(1_000_000));
    (env, account)
}

fn increment() -> Bytes {
    ICounter::incrementCall {}.abi_encode().into()
}

fn fail() -> Bytes {
    ICounter::failCall {}.abi_encode().into()
}

fn account_error(result: Result<impl core::fmt::Debug, ClientError>) -> AccountError {
    match result.unwrap_err() {
        ClientError::Account(error) => error,
        error => panic!("unexpected error: {error}"),
    }
}

#[test]
fn test_initialize_only_once() {
    let (mut env, account) = setup();
    let owner = env.owner_address();
    assert_eq!(account.owner(&mut env.host).unwrap(), owner);

    for (caller, new_owner) in [(STRANGER, STRANGER), (owner, owner), (ENTRY_POINT, STRANGER)] {
        assert_eq!(
            account_error(account.initialize(&mut env.host, caller, new_owner)),
            AccountError::AlreadyInitialized
        );
    }
    assert_eq!(account.owner(&mut env.host).unwrap(), owner);
}

#[test]
fn test_initialize_emits_event() {
    let (env, account) = setup();
    let initialized = env
        .host
        .logs()
        .iter()
        .filter(|log| log.address == account.address())
        .find_map(|log| ISmartAccount::AccountInitialized::decode_log_data(&log.data, true).ok())
        .unwrap();
    assert_eq!(initialized.entryPoint, ENTRY_POINT);
    assert_eq!(initialized.owner, env.owner_address());
}

#[test]
fn test_execute_by_owner_and_entry_point() {
    let (mut env, account) = setup();
    let owner = env.owner_address();

    account.execute(&mut env.host, owner, COUNTER, U256::ZERO, increment()).unwrap();
    account.execute(&mut env.host, ENTRY_POINT, COUNTER, U256::ZERO, increment()).unwrap();
    assert_eq!(Counter::number(&mut env.host, COUNTER), U256::from(2));
}

#[test]
fn test_execute_returns_callee_output() {
    let (mut env, account) = setup();
    env.host.set_storage(COUNTER, U256::ZERO, U256::from(7));

    let output = account
        .execute(
            &mut env.host,
            env.owner.address(),
            COUNTER,
            U256::ZERO,
            ICounter::numberCall {}.abi_encode().into(),
        )
        .unwrap();
    assert_eq!(ICounter::numberCall::abi_decode_returns(&output, true).unwrap()._0, U256::from(7));
}

#[test]
fn test_execute_transfers_value() {
    let (mut env, account) = setup();
    let recipient = address!("000000000000000000000000000000000000beef");

    account
        .execute(&mut env.host, env.owner.address(), recipient, U256::from(400), Bytes::new())
        .unwrap();
    assert_eq!(env.host.balance(recipient), U256::from(400));
    assert_eq!(env.host.balance(account.address()), U256::from(999_600));
}

#[test]
fn test_execute_rejects_strangers() {
    let (mut env, account) = setup();
    assert_eq!(
        account_error(account.execute(&mut env.host, STRANGER, COUNTER, U256::ZERO, increment())),
        AccountError::Unauthorized
    );
    assert_eq!(Counter::number(&mut env.host, COUNTER), U256::ZERO);
}

#[test]
fn test_execute_passes_revert_payload_through() {
    let (mut env, account) = setup();
    let result = env.host.transact(TxEnv {
        caller: env.owner.address(),
        to: account.address(),
        data: ISmartAccount::executeCall { target: COUNTER, value: U256::ZERO, data: fail() }
            .abi_encode()
            .into(),
        ..Default::default()
    });
    assert_eq!(result, ExecutionResult::Revert { output: Counter::failure() });
}

#[test]
fn test_execute_batch_in_order() {
    let (mut env, account) = setup();
    let set_number = ICounter::setNumberCall { number: U256::from(10) }.abi_encode().into();

    account
        .execute_batch(
            &mut env.host,
            env.owner.address(),
            vec![COUNTER, COUNTER],
            vec![U256::ZERO, U256::ZERO],
            vec![set_number, increment()],
        )
        .unwrap();
    assert_eq!(Counter::number(&mut env.host, COUNTER), U256::from(11));
}

#[test]
fn test_execute_batch_rejects_strangers() {
    let (mut env, account) = setup();
    assert_eq!(
        account_error(account.execute_batch(
            &mut env.host,
            STRANGER,
            vec![COUNTER],
            vec![U256::ZERO],
            vec![increment()],
        )),
        AccountError::Unauthorized
    );
    account
        .execute_batch(
            &mut env.host,
            ENTRY_POINT,
            vec![COUNTER],
            vec![U256::ZERO],
            vec![increment()],
        )
        .unwrap();
    assert_eq!(Counter::number(&mut env.host, COUNTER), U256::from(1));
}

#[test]
fn test_execute_batch_length_mismatch_makes_no_calls() {
    let (mut env, account) = setup();
    let error = account_error(account.execute_batch(
        &mut env.host,
        env.owner.address(),
        vec![COUNTER, COUNTER],
        vec![U256::ZERO, U256::ZERO, U256::ZERO],
        vec![increment(), increment()],
    ));
    assert_eq!(error, AccountError::LengthMismatch);

    let error = account_error(account.execute_batch(
        &mut env.host,
        env.owner.address(),
        vec![COUNTER, COUNTER],
        vec![U256::ZERO, U256::ZERO],
        vec![increment()],
    ));
    assert_eq!(error, AccountError::LengthMismatch);
    assert_eq!(Counter::number(&mut env.host, COUNTER), U256::ZERO);
}

#[test]
fn test_execute_batch_failure_rolls_back_earlier_calls() {
    let (mut env, account) = setup();
    let recipient = address!("000000000000000000000000000000000000beef");

    let error = account_error(account.execute_batch(
        &mut env.host,
        env.owner.address(),
        vec![COUNTER, COUNTER, recipient],
        vec![U256::ZERO, U256::ZERO, U256::from(1)],
        vec![increment(), fail(), Bytes::new()],
    ));
    assert_eq!(error, AccountError::CallReverted(Counter::failure()));
    assert_eq!(Counter::number(&mut env.host, COUNTER), U256::ZERO);
    assert_eq!(env.host.balance(recipient), U256::ZERO);
}

#[test]
fn test_unbounded_recursion_reverts_at_default_depth() {
    let (mut env, account) = setup();
    let self_caller = address!("5e1f000000000000000000000000000000000001");
    env.host.set_code(self_caller, SelfCaller.into_code());

    let error = account_error(account.execute(
        &mut env.host,
        env.owner.address(),
        self_caller,
        U256::ZERO,
        Bytes::from_static(b"again"),
    ));
    assert_eq!(error, AccountError::CallReverted(Bytes::new()));
    assert_eq!(env.host.sload(self_caller, U256::ZERO), U256::ZERO);
}

#[test]
fn test_transfer_ownership() {
    let (mut env, account) = setup();
    let owner = env.owner.address();
    let new_owner = TestSigner::from_scalar(0xb0b).address();

    assert_eq!(
        account_error(account.transfer_ownership(&mut env.host, owner, Address::ZERO)),
        AccountError::InvalidOwner
    );
    assert_eq!(
        account_error(account.transfer_ownership(&mut env.host, STRANGER, new_owner)),
        AccountError::Unauthorized
    );
    // The entry point may execute, but not hand the account over.
    assert_eq!(
        account_error(account.transfer_ownership(&mut env.host, ENTRY_POINT, new_owner)),
        AccountError::Unauthorized
    );

    account.transfer_ownership(&mut env.host, owner, new_owner).unwrap();
    assert_eq!(account.owner(&mut env.host).unwrap(), new_owner);

    let transferred = env
        .host
        .logs()
        .last()
        .map(|log| ISmartAccount::OwnershipTransferred::decode_log_data(&log.data, true).unwrap())
        .unwrap();
    assert_eq!(transferred.previousOwner, owner);
    assert_eq!(transferred.newOwner, new_owner);

    assert_eq!(
        account_error(account.execute(&mut env.host, owner, COUNTER, U256::ZERO, increment())),
        AccountError::Unauthorized
    );
    account.execute(&mut env.host, new_owner, COUNTER, U256::ZERO, increment()).unwrap();
    assert_eq!(Counter::number(&mut env.host, COUNTER), U256::from(1));
}

#[test]
fn test_uninitialized_implementation_has_no_owner() {
    let (mut env, _) = setup();
    let implementation = AccountHandle::new(env.account_implementation);

    assert_eq!(implementation.owner(&mut env.host).unwrap(), Address::ZERO);
    assert_eq!(
        account_error(implementation.execute(
            &mut env.host,
            Address::ZERO,
            COUNTER,
            U256::ZERO,
            increment()
        )),
        AccountError::Unauthorized
    );
    assert_eq!(
        account_error(implementation.transfer_ownership(&mut env.host, Address::ZERO, STRANGER)),
        AccountError::Unauthorized
    );
}

#[test]
fn test_receives_plain_transfers() {
    let (mut env, account) = setup();
    let result = env.host.transact(TxEnv {
        caller: env.owner.address(),
        to: account.address(),
        value: U256::from(5),
        ..Default::default()
    });
    assert!(result.is_success());
    assert_eq!(env.host.balance(account.address()), U256::from(1_000_005));
}

#[test]
fn test_unknown_selector_reverts_empty() {
    let (mut env, account) = setup();
    let input = Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef]);
    let result = env.host.view(STRANGER, account.address(), input);
    assert_eq!(result, Err(Revert::empty()));
}

#[test]
fn test_entry_point_getter() {
    let (mut env, account) = setup();
    assert_eq!(account.entry_point(&mut env.host).unwrap(), ENTRY_POINT);
}
