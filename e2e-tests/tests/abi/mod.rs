#![allow(dead_code)]
use alloy::sol;

sol!(
    contract Erc20 {
        function totalSupply() external view returns (uint256 totalSupply);
        function balanceOf(address account) external view returns (uint256 balance);
        function allowance(address owner, address spender) external view returns (uint256 allowance);
        function approve(address spender, uint256 amount) external returns (bool);

        #[derive(Debug, PartialEq)]
        event Approval(address indexed owner, address indexed spender, uint256 value);
    }
);

sol!(
    contract ContractImpl {
        function doTheThing() external pure returns (bool);
    }
);

sol!(
    contract IContractUser {
        function linkContract(address implementation) external;
        function doTheThing() external view returns (bool);
    }
);
