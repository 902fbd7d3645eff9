use serde::{Serialize, de::DeserializeOwned};
use std::io::{self, Read, Write};

use super::errors::{Result, SerializationError};

/// Maximum allowed frame payload (1MB).
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Encode a value with the wire configuration.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let bytes = bincode::serde::encode_to_vec(value, bincode::config::standard())?;
    if bytes.len() > MAX_MESSAGE_SIZE {
        return Err(SerializationError::MessageTooLarge {
            actual: bytes.len(),
            max: MAX_MESSAGE_SIZE,
        });
    }
    Ok(bytes)
}

/// Decode a value that must span the whole buffer.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let (value, read) = bincode::serde::decode_from_slice(bytes, bincode::config::standard())?;
    if read != bytes.len() {
        return Err(SerializationError::InvalidFormat(format!(
            "{} trailing bytes",
            bytes.len() - read
        )));
    }
    Ok(value)
}

fn into_io_error(error: SerializationError) -> io::Error {
    match error {
        SerializationError::Decode(bincode::error::DecodeError::Io { inner, .. }) => inner,
        SerializationError::Encode(bincode::error::EncodeError::Io { inner, .. }) => inner,
        other => io::Error::new(io::ErrorKind::InvalidData, other.to_string()),
    }
}

pub fn read_prefixed<T: DeserializeOwned, R: Read>(reader: &mut R) -> io::Result<T> {
    let mut len_bytes = [0; 4];
    reader.read_exact(&mut len_bytes)?;
    let len = u32::from_le_bytes(len_bytes) as usize;

    if len > MAX_MESSAGE_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("message size {len} exceeds maximum allowed size of {MAX_MESSAGE_SIZE} bytes"),
        ));
    }

    // A non-blocking reader that stalls mid-frame is treated as a sender
    // that doesn't follow the prefix protocol.
    let mut buf = vec![0; len];
    if let Err(error) = reader.read_exact(&mut buf) {
        let kind = match error.kind() {
            io::ErrorKind::WouldBlock => io::ErrorKind::InvalidData,
            error => error,
        };
        return Err(kind.into());
    }

    decode(&buf).map_err(into_io_error)
}

pub fn write_prefixed<T: Serialize, W: Write>(writer: &mut W, value: &T) -> io::Result<()> {
    let serialized = encode(value).map_err(into_io_error)?;

    // Size and payload go out in one write so readers never see a bare prefix.
    let size = serialized.len() as u32;
    let mut buf = Vec::with_capacity(4 + serialized.len());
    buf.extend_from_slice(&size.to_le_bytes());
    buf.extend(serialized);
    writer.write_all(&buf)
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor, Write};
    use std::time::Duration;

    use mio::net::{TcpListener, TcpStream};
    use mio::{Events, Interest, Poll, Token};

    use super::{MAX_MESSAGE_SIZE, decode, encode, read_prefixed, write_prefixed};
    use crate::game::{
        ChallengeMode, ChallengeOutcome,
        entities::{Card, PlayerName, Rank, Suit},
    };
    use crate::net::messages::{
        ActionRequest, BetPlaced, BroadcastEvent, ChallengeResolved, ClientMessage, Envelope,
        InitialState,
    };

    const CLIENT: Token = Token(0);

    fn setup() -> (TcpStream, TcpStream) {
        let server = TcpListener::bind("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = server.local_addr().unwrap();
        // Connect with a blocking std socket so the handshake has completed
        // before accepting on the non-blocking listener.
        let client = std::net::TcpStream::connect(addr).unwrap();
        client.set_nonblocking(true).unwrap();
        let (stream, _) = server.accept().unwrap();
        (TcpStream::from_std(client), stream)
    }

    fn wait_readable(poll: &mut Poll, client: &mut TcpStream) {
        poll.registry()
            .register(client, CLIENT, Interest::READABLE)
            .unwrap();
        let mut events = Events::with_capacity(4);
        poll.poll(&mut events, Some(Duration::from_secs(5))).unwrap();
        assert!(events.iter().any(|event| event.token() == CLIENT));
    }

    fn sample_envelopes() -> Vec<Envelope> {
        let initial = InitialState {
            hand: vec![
                Card::new(0, Suit::Club, Rank::Two),
                Card::new(51, Suit::Spade, Rank::Ace),
            ],
            hand_counts: vec![2, 2],
            names: vec![PlayerName::new("alice"), PlayerName::new("bob")],
            starting_turn: 1,
        };
        let bet = BetPlaced {
            bettor: 1,
            card_positions: vec![1, 0],
            wager_size: 2,
            declared_rank: Rank::Queen,
            next_turn: 0,
            game_over: false,
            loser: None,
        };
        let resolved = ChallengeResolved {
            challenger: 0,
            mode: ChallengeMode::Believe,
            reveal_index: 1,
            revealed_card: Card::new(23, Suit::Diamond, Rank::Queen),
            outcome: ChallengeOutcome::TrustJustified,
            pile_recipient: None,
            pile_size: 2,
            received_cards: vec![],
            next_turn: 1,
            game_over: false,
            loser: None,
        };
        vec![
            Envelope::new(1, BroadcastEvent::InitialState(initial)),
            Envelope::new(2, BroadcastEvent::BetPlaced(bet)),
            Envelope::new(3, BroadcastEvent::ChallengeResolved(resolved)),
        ]
    }

    #[test]
    fn write_and_read_over_socket() {
        let (mut client, mut stream) = setup();
        let mut poll = Poll::new().unwrap();
        let envelopes = sample_envelopes();
        for envelope in &envelopes {
            assert!(write_prefixed(&mut stream, envelope).is_ok());
        }
        wait_readable(&mut poll, &mut client);
        // Give the remaining frames time to land in the receive buffer.
        std::thread::sleep(Duration::from_millis(50));
        for envelope in &envelopes {
            let received: Envelope = read_prefixed(&mut client).unwrap();
            assert_eq!(&received, envelope);
        }
    }

    #[test]
    fn write_and_read_client_message() {
        let mut buf = Vec::new();
        let msg = ClientMessage {
            participant: 42,
            request: ActionRequest::PlaceBet {
                card_positions: vec![0, 2, 4],
                declared_rank: Rank::Seven,
            },
        };
        write_prefixed(&mut buf, &msg).unwrap();

        let mut cursor = Cursor::new(buf);
        let received: ClientMessage = read_prefixed(&mut cursor).unwrap();
        assert_eq!(received, msg);
    }

    #[test]
    fn prefix_is_little_endian_payload_length() {
        let mut buf = Vec::new();
        write_prefixed(&mut buf, &"hello".to_string()).unwrap();
        let len = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
        assert_eq!(len, buf.len() - 4);
    }

    #[test]
    fn truncated_payload_is_unexpected_eof() {
        let mut buf = Vec::new();
        buf.write_all(&10u32.to_le_bytes()).unwrap();
        buf.write_all(&[1, 2, 3]).unwrap();
        let mut cursor = Cursor::new(buf);
        assert_eq!(
            read_prefixed::<String, _>(&mut cursor).map_err(|e| e.kind()),
            Err(io::ErrorKind::UnexpectedEof)
        );
    }

    #[test]
    fn partial_length_is_unexpected_eof() {
        let mut cursor = Cursor::new(vec![0u8, 0]);
        assert_eq!(
            read_prefixed::<String, _>(&mut cursor).map_err(|e| e.kind()),
            Err(io::ErrorKind::UnexpectedEof)
        );
    }

    #[test]
    fn reject_oversized_prefix() {
        let mut cursor = Cursor::new(2_000_000_000u32.to_le_bytes().to_vec());
        assert_eq!(
            read_prefixed::<String, _>(&mut cursor).map_err(|e| e.kind()),
            Err(io::ErrorKind::InvalidData)
        );
    }

    #[test]
    fn reject_oversized_payload_on_write() {
        let mut buf = Vec::new();
        let large = "x".repeat(MAX_MESSAGE_SIZE + 1);
        assert_eq!(
            write_prefixed(&mut buf, &large).map_err(|e| e.kind()),
            Err(io::ErrorKind::InvalidData)
        );
        assert!(buf.is_empty());
    }

    #[test]
    fn garbage_payload_is_invalid_data() {
        let mut buf = Vec::new();
        buf.write_all(&2u32.to_le_bytes()).unwrap();
        // Variant tag far outside the enum.
        buf.write_all(&[250, 0]).unwrap();
        let mut cursor = Cursor::new(buf);
        assert_eq!(
            read_prefixed::<Envelope, _>(&mut cursor).map_err(|e| e.kind()),
            Err(io::ErrorKind::InvalidData)
        );
    }

    #[test]
    fn decode_rejects_trailing_bytes() {
        let mut bytes = encode(&7u64).unwrap();
        bytes.push(0);
        assert!(decode::<u64>(&bytes).is_err());
    }

    #[test]
    fn name_sanitized_on_decode() {
        let bytes = encode(&"  spaced  out  ".to_string()).unwrap();
        let name: PlayerName = decode(&bytes).unwrap();
        assert_eq!(name.as_str(), "spaced__out");
    }
}
