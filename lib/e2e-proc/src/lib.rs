//! Procedural macros of the `e2e` harness.
use proc_macro::TokenStream;

mod test;

/// Defines an end-to-end test that gets its funded accounts injected from
/// the arguments.
///
/// Every argument must be a plain identifier of type `Account`; each one
/// receives its own freshly funded account, whose balance is returned to the
/// master account once the test is over.
///
/// # Examples
///
/// ```rust,ignore
/// #[e2e::test]
/// async fn approves(alice: Account) -> Result<()> {
///     let erc20 = alice.as_deployer(&e2e_tests::erc20()?).deploy().await?.contract;
///     let spender = Address::random();
///     erc20
///         .send_typed(&Erc20::approveCall { spender, amount: U256::ONE })
///         .await?;
///     let allowance = erc20
///         .call_typed(&Erc20::allowanceCall { owner: alice.address(), spender })
///         .await?;
///     assert_eq!(allowance, U256::ONE);
///     Ok(())
/// }
/// ```
#[proc_macro_attribute]
pub fn test(attr: TokenStream, input: TokenStream) -> TokenStream {
    test::test(attr, input)
}
