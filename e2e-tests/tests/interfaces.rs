#![cfg(feature = "e2e")]

use abi::{ContractImpl, IContractUser};
use alloy::dyn_abi::DynSolValue;
use e2e::{Account, ContractHandle, Error};
use eyre::Result;

mod abi;

async fn deploy_pair(account: &Account) -> Result<(ContractHandle, ContractHandle)> {
    let implementation = account
        .as_deployer(&e2e_tests::contract_impl()?)
        .deploy()
        .await?
        .contract;
    let user = account
        .as_deployer(&e2e_tests::icontract_user()?)
        .deploy()
        .await?
        .contract;

    tracing::info!(
        implementation = %implementation.address(),
        user = %user.address(),
        "deployed interface pair"
    );
    Ok((implementation, user))
}

#[e2e::test]
async fn linked_user_delegates_to_implementation(alice: Account) -> Result<()> {
    let (implementation, user) = deploy_pair(&alice).await?;

    user.send("linkContract", &[DynSolValue::Address(implementation.address())])
        .await?;

    let output = user.call("doTheThing", &[]).await?;
    assert_eq!(output, vec![DynSolValue::Bool(true)]);

    Ok(())
}

#[e2e::test]
async fn user_returns_what_implementation_returns(alice: Account) -> Result<()> {
    let (implementation, user) = deploy_pair(&alice).await?;

    user.send_typed(&IContractUser::linkContractCall {
        implementation: implementation.address(),
    })
    .await?;

    let direct = implementation
        .call_typed(&ContractImpl::doTheThingCall {})
        .await?;
    let delegated = user.call_typed(&IContractUser::doTheThingCall {}).await?;
    assert!(direct);
    assert_eq!(delegated, direct);

    Ok(())
}

#[e2e::test]
async fn unlinked_user_reverts(alice: Account) -> Result<()> {
    let (_, user) = deploy_pair(&alice).await?;

    let err = user.call("doTheThing", &[]).await.unwrap_err();
    assert!(matches!(err, Error::Rpc { .. }), "{err}");

    Ok(())
}
