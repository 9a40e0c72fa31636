use alloy::sol;

sol! {
    /// The subset of the Nouns governor (DAO proxy) used by this client.
    interface INounsDAO {
        function proposalCount() external view returns (uint256);

        function proposals(uint256 proposalId) external view returns (
            uint256 id,
            address proposer,
            uint256 proposalThreshold,
            uint256 quorumVotes,
            uint256 eta,
            uint256 startBlock,
            uint256 endBlock,
            uint256 forVotes,
            uint256 againstVotes,
            uint256 abstainVotes,
            bool canceled,
            bool vetoed,
            bool executed
        );

        function state(uint256 proposalId) external view returns (uint8);

        function getVotes(address account, uint256 blockNumber) external view returns (uint256);

        function castVote(uint256 proposalId, uint8 support) external returns (uint256);

        function castVoteWithReason(uint256 proposalId, uint8 support, string reason) external returns (uint256);

        function propose(
            address[] targets,
            uint256[] values,
            string[] signatures,
            bytes[] calldatas,
            string description
        ) external returns (uint256);
    }

    /// The subset of the Nouns ERC-721 token used by this client.
    interface INounsToken {
        function balanceOf(address owner) external view returns (uint256);

        function tokenOfOwnerByIndex(address owner, uint256 index) external view returns (uint256);
    }
}
