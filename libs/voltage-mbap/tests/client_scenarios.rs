//! End-to-end client scenarios over an in-memory transport

#![allow(clippy::disallowed_methods)] // Integration test - unwrap is acceptable

use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use voltage_mbap::{
    encode_frame, ClientEvent, DiscardReason, MbapError, ModbusTcpClient, Response, Transport,
    TransportError,
};

#[derive(Debug, Default)]
struct Wire {
    sent: Vec<Bytes>,
}

impl Transport for Wire {
    fn write(&mut self, frame: Bytes) -> Result<(), TransportError> {
        self.sent.push(frame);
        Ok(())
    }
}

type Events = Arc<Mutex<Vec<ClientEvent>>>;

fn new_client() -> (ModbusTcpClient<Wire>, Events) {
    let events: Events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let client = ModbusTcpClient::new(Wire::default(), move |event: ClientEvent| {
        sink.lock().push(event)
    });
    (client, events)
}

fn responses(events: &Events) -> Vec<Response> {
    events
        .lock()
        .iter()
        .filter_map(|event| match event {
            ClientEvent::Response { response, .. } => Some(response.clone()),
            ClientEvent::Discarded { .. } => None,
        })
        .collect()
}

#[test]
fn test_write_single_register_scenario() {
    let (mut client, events) = new_client();
    assert_eq!(client.next_transaction_id(), 1);

    let id = client.write_single_register(0x0010, 0x00AB).unwrap();
    assert_eq!(id, 1);

    let expected = [
        0x00, 0x01, 0x00, 0x00, 0x00, 0x06, 0x00, 0x06, 0x00, 0x10, 0x00, 0xAB,
    ];
    assert_eq!(client.transport().sent[0].as_ref(), &expected);

    client.feed(&expected);

    assert!(!client.is_pending(1));
    assert_eq!(
        responses(&events),
        vec![Response::WriteSingleRegister {
            success: true,
            address: 0x0010,
            value: 0x00AB,
        }]
    );
}

#[test]
fn test_read_holding_registers_scenario() {
    let (mut client, events) = new_client();
    let id = client.read_holding_registers(0x0000, 2).unwrap();

    client.feed(&encode_frame(id, 0, 0x03, &[0x04, 0x00, 0x11, 0x00, 0x22]));

    assert_eq!(
        responses(&events),
        vec![
            Response::HoldingRegister {
                address: 0x0000,
                value: 0x0011,
            },
            Response::HoldingRegister {
                address: 0x0001,
                value: 0x0022,
            },
            Response::HoldingRegisters {
                start_address: 0x0000,
                values: vec![0x0011, 0x0022],
            },
        ]
    );
}

#[test]
fn test_every_operation_round_trip() {
    let (mut client, events) = new_client();

    let fc06 = client.write_single_register(0x0001, 0x0003).unwrap();
    let fc03 = client.read_holding_registers(0x006B, 1).unwrap();
    let fc04 = client.read_input_registers(0x0008, 1).unwrap();
    let fc05 = client.force_single_coil(0x00AC, true).unwrap();
    let coils = [true, false, true, true, false, false, true, true, true, false];
    let fc15 = client.force_multiple_coils(0x0013, &coils).unwrap();
    let fc02 = client.read_input_status(0x00C4, 5).unwrap();
    let fc16 = client
        .preset_multiple_registers(0x0001, &[0x000A, 0x0102])
        .unwrap();
    assert_eq!(client.pending(), 7);

    let mut wire = Vec::new();
    wire.extend_from_slice(&encode_frame(fc06, 0, 0x06, &[0x00, 0x01, 0x00, 0x03]));
    wire.extend_from_slice(&encode_frame(fc03, 0, 0x03, &[0x02, 0x02, 0x2B]));
    wire.extend_from_slice(&encode_frame(fc04, 0, 0x04, &[0x02, 0x00, 0x0A]));
    wire.extend_from_slice(&encode_frame(fc05, 0, 0x05, &[0x00, 0xAC, 0xFF, 0x00]));
    wire.extend_from_slice(&encode_frame(fc15, 0, 0x0F, &[0x00, 0x13, 0x00, 0x0A]));
    wire.extend_from_slice(&encode_frame(fc02, 0, 0x02, &[0x01, 0b0001_0101]));
    wire.extend_from_slice(&encode_frame(fc16, 0, 0x10, &[0x00, 0x01, 0x00, 0x02]));

    assert_eq!(client.feed(&wire), 7);
    assert_eq!(client.pending(), 0);

    assert_eq!(
        responses(&events),
        vec![
            Response::WriteSingleRegister {
                success: true,
                address: 0x0001,
                value: 0x0003,
            },
            Response::HoldingRegister {
                address: 0x006B,
                value: 0x022B,
            },
            Response::HoldingRegisters {
                start_address: 0x006B,
                values: vec![0x022B],
            },
            Response::InputRegister {
                address: 0x0008,
                value: 0x000A,
            },
            Response::InputRegisters {
                start_address: 0x0008,
                values: vec![0x000A],
            },
            Response::ForceSingleCoil {
                success: true,
                address: 0x00AC,
                value: true,
            },
            Response::ForceMultipleCoils {
                success: true,
                start_address: 0x0013,
                requested: coils.to_vec(),
                written: 10,
            },
            Response::InputStatus {
                start_address: 0x00C4,
                values: vec![true, false, true, false, true],
            },
            Response::PresetMultipleRegisters {
                success: true,
                start_address: 0x0001,
                requested: vec![0x000A, 0x0102],
                written: 2,
            },
        ]
    );
}

#[test]
fn test_responses_out_of_request_order() {
    let (mut client, events) = new_client();
    let first = client.read_input_registers(0x0000, 1).unwrap();
    let second = client.read_input_registers(0x0100, 1).unwrap();

    client.feed(&encode_frame(second, 0, 0x04, &[0x02, 0xBE, 0xEF]));
    client.feed(&encode_frame(first, 0, 0x04, &[0x02, 0xCA, 0xFE]));

    let aggregates: Vec<(u16, Response)> = events
        .lock()
        .iter()
        .filter_map(|event| match event {
            ClientEvent::Response {
                transaction_id,
                response: response @ Response::InputRegisters { .. },
            } => Some((*transaction_id, response.clone())),
            _ => None,
        })
        .collect();

    assert_eq!(
        aggregates,
        vec![
            (second, Response::InputRegisters {
                start_address: 0x0100,
                values: vec![0xBEEF],
            }),
            (first, Response::InputRegisters {
                start_address: 0x0000,
                values: vec![0xCAFE],
            }),
        ]
    );
}

#[test]
fn test_byte_by_byte_delivery() {
    let (mut client, events) = new_client();
    let id = client.force_single_coil(0x0002, false).unwrap();
    let response = encode_frame(id, 0, 0x05, &[0x00, 0x02, 0x00, 0x00]);

    let frames: usize = response.chunks(1).map(|byte| client.feed(byte)).sum();

    assert_eq!(frames, 1);
    assert_eq!(
        responses(&events),
        vec![Response::ForceSingleCoil {
            success: true,
            address: 0x0002,
            value: false,
        }]
    );
}

#[test]
fn test_unknown_id_leaves_registry_untouched() {
    let (mut client, events) = new_client();
    let a = client.read_input_status(0, 8).unwrap();
    let b = client.read_input_status(8, 8).unwrap();

    client.feed(&encode_frame(0x7777, 0, 0x02, &[0x01, 0xFF]));

    assert_eq!(client.pending(), 2);
    assert!(client.is_pending(a));
    assert!(client.is_pending(b));
    assert_eq!(
        events.lock().as_slice(),
        &[ClientEvent::Discarded {
            transaction_id: 0x7777,
            reason: DiscardReason::UnknownTransaction,
        }]
    );
}

#[test]
fn test_second_response_with_same_id_is_unknown() {
    let (mut client, events) = new_client();
    let id = client.write_single_register(1, 1).unwrap();
    let echo = encode_frame(id, 0, 0x06, &[0x00, 0x01, 0x00, 0x01]);

    client.feed(&echo);
    client.feed(&echo);

    let events = events.lock();
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[1],
        ClientEvent::Discarded {
            transaction_id: id,
            reason: DiscardReason::UnknownTransaction,
        }
    );
}

#[test]
fn test_oversize_guards() {
    let (mut client, _) = new_client();

    assert!(client.force_multiple_coils(0, &[true; 2040]).is_ok());
    assert!(matches!(
        client.force_multiple_coils(0, &[true; 2041]),
        Err(MbapError::OversizeRequest {
            function_code: 0x0F,
            ..
        })
    ));

    assert!(client.preset_multiple_registers(0, &[7; 255]).is_ok());
    assert!(matches!(
        client.preset_multiple_registers(0, &[7; 256]),
        Err(MbapError::OversizeRequest {
            function_code: 0x10,
            ..
        })
    ));

    // Only the two accepted requests consumed ids and reached the wire
    assert_eq!(client.next_transaction_id(), 3);
    assert_eq!(client.transport().sent.len(), 2);
}
