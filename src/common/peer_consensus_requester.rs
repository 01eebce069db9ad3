use rayon::prelude::*;
use std::ops::Fn;
use std::result::Result;

use crate::common::cancellation::CancellationToken;
use crate::common::NodeId;
use crate::errors::RaftError;

/// Sends `request` to every peer in parallel and hands each outcome to `on_response` as soon as
/// it arrives. Peers that were not contacted yet when the token got cancelled are skipped, and
/// outcomes arriving after cancellation are dropped.
pub fn request_peer_responses<Req, Resp, Requester, OnResponse>(
    request: Req,
    peers: Vec<NodeId>,
    cancellation: &CancellationToken,
    requester: Requester,
    on_response: OnResponse,
) where
    Requester: Fn(NodeId, Req) -> Result<Resp, RaftError> + Sync,
    OnResponse: Fn(NodeId, Result<Resp, RaftError>) + Sync,
    Req: Clone + Sync + Send,
{
    if peers.is_empty() {
        return;
    }

    peers.into_par_iter().for_each(|peer_id| {
        if cancellation.is_cancelled() {
            trace!("Request to Node {} skipped: cancelled", peer_id);
            return;
        }

        let response = requester(peer_id, request.clone());

        if cancellation.is_cancelled() {
            trace!("Response from Node {} discarded: cancelled", peer_id);
            return;
        }

        on_response(peer_id, response);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use parking_lot::Mutex;

    #[test]
    fn test_all_peers_answer() {
        let token = CancellationToken::new();
        let received = Mutex::new(Vec::new());

        request_peer_responses(
            7u64,
            vec![2, 3, 4],
            &token,
            |peer, req| Ok(peer * req),
            |peer, resp: Result<u64, RaftError>| received.lock().push((peer, resp.unwrap())),
        );

        let mut received = received.into_inner();
        received.sort();
        assert_eq!(vec![(2, 14), (3, 21), (4, 28)], received);
    }

    #[test]
    fn test_failures_are_reported() {
        let token = CancellationToken::new();
        let failures = Mutex::new(0);

        request_peer_responses(
            (),
            vec![2, 3],
            &token,
            |_, _| -> Result<(), RaftError> {
                Err(RaftError::new(ErrorKind::Communication, "unreachable".to_string()))
            },
            |_, resp| {
                if resp.is_err() {
                    *failures.lock() += 1;
                }
            },
        );

        assert_eq!(2, failures.into_inner());
    }

    #[test]
    fn test_cancelled_fan_out_reports_nothing() {
        let token = CancellationToken::new();
        token.cancel();
        let received = Mutex::new(0);

        request_peer_responses(
            (),
            vec![2, 3, 4],
            &token,
            |_, _| Ok(()),
            |_, _: Result<(), RaftError>| *received.lock() += 1,
        );

        assert_eq!(0, received.into_inner());
    }
}
