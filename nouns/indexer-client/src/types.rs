use serde::{Deserialize, Serialize};

pub trait Variables {
    type Query: graphql_client::GraphQLQuery<Variables = Self>;
}

/// Declares one unit struct per query and wires it to the `Variables` and
/// `ResponseData` types of the module with the same name in snake case.
///
/// The modules are written by hand instead of derived from a schema: the
/// subgraph serves `BigInt` fields as strings or as numbers depending on the
/// deployment, and both must land in [`RawNumber`].
macro_rules! generate_queries {
    ($({name: $name:ident, operation: $operation:literal, path: $path:literal}), * $(,)?) => {
        $(
            pub struct $name;

            paste::paste! {
                impl graphql_client::GraphQLQuery for $name {
                    type ResponseData = [<$name:snake>]::ResponseData;
                    type Variables = [<$name:snake>]::Variables;

                    fn build_query(
                        variables: Self::Variables,
                    ) -> graphql_client::QueryBody<Self::Variables> {
                        graphql_client::QueryBody {
                            variables,
                            query: include_str!($path),
                            operation_name: $operation,
                        }
                    }
                }

                impl Variables for [<$name:snake>]::Variables {
                    type Query = $name;
                }
            }
        )*
    };
}

generate_queries! {
    {
        name: GetProposals,
        operation: "GetProposals",
        path: "queries/getProposals.graphql"
    },
    {
        name: GetProposal,
        operation: "GetProposal",
        path: "queries/getProposal.graphql"
    },
    {
        name: GetProposalsByStatus,
        operation: "GetProposalsByStatus",
        path: "queries/getProposalsByStatus.graphql"
    },
    {
        name: GetProposalVotes,
        operation: "GetProposalVotes",
        path: "queries/getProposalVotes.graphql"
    },
    {
        name: GetVoterStats,
        operation: "GetVoterStats",
        path: "queries/getVoterStats.graphql"
    },
    {
        name: SearchProposals,
        operation: "SearchProposals",
        path: "queries/searchProposals.graphql"
    },
}

pub mod get_proposals {
    use super::*;

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub first: i64,
        pub skip: i64,
        pub order_by: ProposalOrderBy,
        pub order_direction: OrderDirection,
    }

    #[derive(Deserialize, Debug)]
    pub struct ResponseData {
        pub proposals: Vec<RawProposal>,
    }
}

pub mod get_proposal {
    use super::*;

    #[derive(Serialize, Debug)]
    pub struct Variables {
        pub id: String,
    }

    #[derive(Deserialize, Debug)]
    pub struct ResponseData {
        pub proposal: Option<RawProposal>,
    }
}

pub mod get_proposals_by_status {
    use super::*;

    #[derive(Serialize, Debug)]
    pub struct Variables {
        pub status: String,
        pub first: i64,
    }

    #[derive(Deserialize, Debug)]
    pub struct ResponseData {
        pub proposals: Vec<RawProposal>,
    }
}

pub mod get_proposal_votes {
    use super::*;

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub proposal_id: String,
        pub first: i64,
    }

    #[derive(Deserialize, Debug)]
    pub struct ResponseData {
        pub votes: Vec<RawVote>,
    }
}

pub mod get_voter_stats {
    use super::*;

    #[derive(Serialize, Debug)]
    pub struct Variables {
        pub voter: String,
    }

    #[derive(Deserialize, Debug)]
    pub struct ResponseData {
        pub votes: Vec<RawVote>,
    }
}

pub mod search_proposals {
    use super::*;

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub search_term: String,
        pub first: i64,
    }

    #[derive(Deserialize, Debug)]
    pub struct ResponseData {
        pub proposals: Vec<RawProposal>,
    }
}

// ------------------------------- query enums --------------------------------

/// Sort keys accepted by the subgraph's `Proposal_orderBy` enum.
#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ProposalOrderBy {
    #[default]
    CreatedTimestamp,
    CreatedBlock,
    StartBlock,
    EndBlock,
    ForVotes,
}

#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    Asc,
    #[default]
    Desc,
}

// ------------------------------- raw records --------------------------------

/// A number the subgraph may send as a JSON string (`BigInt`), a JSON
/// integer, or occasionally a float.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum RawNumber {
    Text(String),
    Integer(u64),
    Float(f64),
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct RawAccount {
    pub id: String,
}

/// A proposal exactly as the subgraph returned it. Queries select different
/// subsets of fields, so everything except the id is optional.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawProposal {
    pub id: RawNumber,
    pub proposer: Option<RawAccount>,
    pub targets: Option<Vec<String>>,
    pub values: Option<Vec<String>>,
    pub signatures: Option<Vec<String>>,
    pub calldatas: Option<Vec<String>>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub created_timestamp: Option<RawNumber>,
    pub start_block: Option<RawNumber>,
    pub end_block: Option<RawNumber>,
    pub for_votes: Option<RawNumber>,
    pub against_votes: Option<RawNumber>,
    pub abstain_votes: Option<RawNumber>,
    pub canceled: Option<bool>,
    pub executed: Option<bool>,
    pub created_transaction_hash: Option<String>,
    pub executed_transaction_hash: Option<String>,
    pub votes: Option<Vec<RawVote>>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawVote {
    pub id: String,
    pub support: Option<RawNumber>,
    pub votes: Option<RawNumber>,
    pub voter: Option<RawAccount>,
    pub block_number: Option<RawNumber>,
    pub reason: Option<String>,
    pub proposal: Option<RawVotedProposal>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct RawVotedProposal {
    pub id: RawNumber,
    pub description: Option<String>,
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {
        super::*,
        graphql_client::{GraphQLQuery, Response},
    };

    #[test]
    fn builds_query_bodies() {
        let body = GetProposals::build_query(get_proposals::Variables {
            first: 20,
            skip: 0,
            order_by: ProposalOrderBy::CreatedTimestamp,
            order_direction: OrderDirection::Desc,
        });

        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["operationName"], "GetProposals");
        assert_eq!(json["variables"]["orderBy"], "createdTimestamp");
        assert_eq!(json["variables"]["orderDirection"], "desc");
        assert!(body.query.contains("proposals("));
    }

    #[test]
    fn raw_numbers_accept_strings_and_integers() {
        let body = r#"{
            "data": {
                "proposals": [
                    { "id": "12", "forVotes": "5000000000000000000", "startBlock": 100 },
                    { "id": 13, "endBlock": null }
                ]
            }
        }"#;

        let response: Response<get_proposals::ResponseData> = serde_json::from_str(body).unwrap();
        let proposals = response.data.unwrap().proposals;

        assert_eq!(proposals[0].id, RawNumber::Text("12".to_string()));
        assert_eq!(proposals[0].start_block, Some(RawNumber::Integer(100)));
        assert_eq!(proposals[1].id, RawNumber::Integer(13));
        assert_eq!(proposals[1].end_block, None);
    }

    #[test]
    fn missing_top_level_field_fails_to_parse() {
        let body = r#"{ "data": { "proposal": null } }"#;

        assert!(serde_json::from_str::<Response<get_proposals::ResponseData>>(body).is_err());
    }
}
