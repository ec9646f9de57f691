//! Canonical PDPVerifier ABI, declared with `alloy::sol!` the way the
//! teacher declares its cross-chain messenger interfaces.

use alloy::sol;

sol! {
    struct Cid {
        bytes data;
    }

    struct RootData {
        Cid root;
        uint256 rawSize;
    }

    struct Challenge {
        uint256 rootId;
        uint256 offset;
    }

    struct Proof {
        bytes32 leaf;
        bytes32[] proof;
    }

    struct RootIdAndOffset {
        uint256 rootId;
        uint256 offset;
    }

    #[derive(Debug)]
    interface PDPVerifier {
        event ProofSetCreated(uint256 indexed setId, address indexed owner);
        event ProofSetOwnerChanged(uint256 indexed setId, address indexed oldOwner, address indexed newOwner);
        event RootsAdded(uint256 indexed setId, uint256[] rootIds);
        event RootsRemoved(uint256 indexed setId, uint256[] rootIds);
        event PossessionProven(uint256 indexed setId, Challenge[] challenges);
        event NextProvingPeriod(uint256 indexed setId, uint256 nextChallengeEpoch, uint256 leafCount);
        event FaultRecord(uint256 indexed setId, uint256 periodsFaulted, uint256 deadline);
        event ProofFeePaid(uint256 indexed setId, uint256 fee, uint64 price, int32 expo);
        event ProofSetEmpty(uint256 indexed setId);

        function addRoots(uint256 setId, RootData[] rootData, bytes extraData) external;
        function provePossession(uint256 setId, Proof[] proofs) external;
        function nextProvingPeriod(uint256 setId, uint256 challengeEpoch, bytes extraData) external;

        function getRandomness(uint256 epoch) external view returns (uint256);
        function findRootIds(uint256 setId, uint256[] leafIndices) external view returns (RootIdAndOffset[] memory);
    }
}
