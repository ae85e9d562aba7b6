//! Advertisements captured from real battery management systems, labelled
//! with the vendor protocol each device speaks.

use bluest::Uuid;
use bms_reader::{uuid16, AdvertisementRecord};

fn uuid(s: &str) -> Uuid {
    Uuid::parse_str(s).unwrap()
}

pub fn advertisements() -> Vec<(&'static str, AdvertisementRecord)> {
    vec![
        (
            "ective_bms",
            AdvertisementRecord::new()
                .with_local_name(b"NWJ20221223010330\x11")
                .with_service(uuid16(0xffe0))
                .with_manufacturer_data(65535, b"0UD7\xa2\xd2")
                .with_rssi(-56),
        ),
        (
            "ective_bms",
            AdvertisementRecord::new()
                .with_local_name(b"NWJ20221223010388\x11")
                .with_service(uuid16(0xffe0))
                .with_manufacturer_data(65535, b"0UD7b\xec")
                .with_rssi(-47),
        ),
        (
            "ective_bms",
            AdvertisementRecord::new()
                .with_local_name(b"$PFLAC,R,RADIOID\x0d\x0a")
                .with_service(uuid16(0xffe0))
                .with_manufacturer_data(65535, b"\x10UD3\xe8\xb4")
                .with_rssi(-47),
        ),
        (
            "ective_bms",
            AdvertisementRecord::new()
                .with_local_name(b"NWJ20200720020539")
                .with_service(uuid16(0xffe0))
                .with_manufacturer_data(0, b"4\x14\xb5\x9dx\xe7L"),
        ),
        (
            "jikong_bms",
            AdvertisementRecord::new()
                .with_local_name(b"BatteryOben-00")
                .with_service(uuid16(0xffe0))
                .with_manufacturer_data(2917, b"\x88\xa0\xc8G\x80\x0f\xd5\xc5")
                .with_tx_power(-127)
                .with_rssi(-83),
        ),
        (
            "jikong_bms",
            AdvertisementRecord::new()
                .with_local_name(b"BatterieUnten-01")
                .with_service(uuid16(0xffe0))
                .with_manufacturer_data(2917, b"\x88\xa0\xc8G\x80\x0d\x08k")
                .with_tx_power(-127)
                .with_rssi(-68),
        ),
        (
            "jikong_bms",
            AdvertisementRecord::new()
                .with_local_name(b"JK_B2A8S20P")
                .with_service(uuid16(0x1800))
                .with_service(uuid16(0x1801))
                .with_service(uuid16(0x180a))
                .with_service(uuid16(0x180f))
                .with_service(uuid16(0xfee7))
                .with_service(uuid16(0xffe0))
                .with_service(uuid("f000ffc0-0451-4000-b000-000000000000"))
                .with_manufacturer_data(2917, b"\x88\xa0\xc8G\x80\x14\x88\xb7")
                .with_rssi(-67),
        ),
        (
            "seplos_bms",
            AdvertisementRecord::new()
                .with_local_name(b"SP05B2312190075       ")
                .with_service(uuid16(0xfff0))
                .with_tx_power(-127)
                .with_rssi(-76),
        ),
        (
            "seplos_bms",
            AdvertisementRecord::new()
                .with_local_name(b"SP51B2407270006       ")
                .with_service(uuid16(0x1800))
                .with_service(uuid16(0x1801))
                .with_service(uuid16(0xfff0))
                .with_service(uuid("02f00000-0000-0000-8000-00000000fe00"))
                .with_rssi(-46),
        ),
        (
            "seplos_bms",
            AdvertisementRecord::new()
                .with_local_name(b"SP66B2404270002       ")
                .with_service(uuid16(0xfff0))
                .with_rssi(-81),
        ),
        (
            "seplos_v2_bms",
            AdvertisementRecord::new()
                .with_local_name(b"BP02")
                .with_service(uuid16(0xff00))
                .with_rssi(-81),
        ),
        (
            "seplos_v2_bms",
            AdvertisementRecord::new()
                .with_local_name(b"BP02")
                .with_service(uuid16(0x1800))
                .with_service(uuid16(0x1801))
                .with_service(uuid16(0xff00))
                .with_rssi(-90),
        ),
        (
            "ej_bms",
            AdvertisementRecord::new()
                .with_local_name(b"LT-12V-1544")
                .with_manufacturer_data(33384, b"\x01\x02\x00\x07\x81\xb5N")
                .with_tx_power(-127)
                .with_rssi(-71),
        ),
        (
            "ej_bms",
            AdvertisementRecord::new()
                .with_local_name(b"L-12V100AH-0902")
                .with_tx_power(5)
                .with_rssi(-87),
        ),
        (
            "ej_bms",
            AdvertisementRecord::new()
                .with_local_name(b"LT-12V-0002\x0d\x0a")
                .with_tx_power(5)
                .with_rssi(-94),
        ),
        (
            "cbtpwr_bms",
            AdvertisementRecord::new()
                .with_local_name(b"170R000121")
                .with_service(uuid16(0x1800))
                .with_service(uuid16(0x1801))
                .with_service(uuid16(0x180a))
                .with_service(uuid16(0xfd00))
                .with_service(uuid16(0xff90))
                .with_service(uuid16(0xffb0))
                .with_service(uuid16(0xffc0))
                .with_service(uuid16(0xffd0))
                .with_service(uuid16(0xffe0))
                .with_service(uuid16(0xffe5))
                .with_service(uuid16(0xfff0))
                .with_manufacturer_data(
                    21330,
                    b"!4\xba\x03\xec\x11\x0c\xb4\x01\x05\x00\x01\x00\x00",
                )
                .with_tx_power(0)
                .with_rssi(-75),
        ),
        (
            "tdt_bms",
            AdvertisementRecord::new()
                .with_manufacturer_data(54976, b"<O\xacP\xff"),
        ),
        (
            "dpwrcore_bms",
            AdvertisementRecord::new()
                .with_local_name(b"TBA-13500277")
                .with_service(uuid16(0x1800))
                .with_service(uuid16(0x1801))
                .with_service(uuid16(0x180a))
                .with_service(uuid16(0xfff0))
                .with_rssi(-72),
        ),
        (
            "ogt_bms",
            AdvertisementRecord::new()
                .with_local_name(b"SmartBat-B15051")
                .with_service(uuid16(0xfff0))
                .with_tx_power(3)
                .with_rssi(-66),
        ),
        (
            "redodo_bms",
            AdvertisementRecord::new()
                .with_local_name(b"R-24100BNN160-A00643")
                .with_service(uuid16(0xffe0))
                .with_manufacturer_data(22618, b"\xc8G\x80\x15\xd84"),
        ),
        (
            "daly_bms",
            AdvertisementRecord::new()
                .with_local_name(b"DL-46640102XXXX")
                .with_service(uuid16(0xfff0))
                .with_manufacturer_data(25670, b"\x01\x02\x09\xac")
                .with_tx_power(-127)
                .with_rssi(-58),
        ),
        (
            "daly_bms",
            AdvertisementRecord::new()
                .with_local_name(b"DL-401710015C9B")
                .with_manufacturer_data(770, b"\x16@\x17\x10\x01\\\x9bDL")
                .with_rssi(-36),
        ),
        (
            "daly_bms",
            AdvertisementRecord::new()
                .with_local_name(b"JHB-501812XXXXXX")
                .with_manufacturer_data(260, b"\x01P\x18\x12\x01\xa3\xb3JHB")
                .with_rssi(-46),
        ),
        (
            "daly_bms",
            AdvertisementRecord::new()
                .with_local_name(b"Randomname")
                .with_manufacturer_data(260, b"\x01P\x18\x12\x01\xa4\x94JHB")
                .with_tx_power(-127)
                .with_rssi(-36),
        ),
        (
            "daly_bms",
            AdvertisementRecord::new()
                .with_local_name(b"BT270-2")
                .with_manufacturer_data(770, b"\x16@\x17\x12\x01\x11\x97DL")
                .with_rssi(-60),
        ),
        (
            "jbd_bms",
            AdvertisementRecord::new()
                .with_local_name(b"SX100P-B230201")
                .with_service(uuid16(0xff00))
                .with_manufacturer_data(31488, b"\x02\xff\xff}"),
        ),
        (
            "jbd_bms",
            AdvertisementRecord::new()
                .with_local_name(b"DP04S007L4S100A")
                .with_service(uuid16(0xff00))
                .with_manufacturer_data(6226, b"(7\xc2\xa5")
                .with_rssi(-57),
        ),
        (
            "jbd_bms",
            AdvertisementRecord::new()
                .with_local_name(b"DP04S007L4S100A")
                .with_service(uuid16(0xff00))
                .with_manufacturer_data(8856, b"(7\xc2\xa5")
                .with_rssi(-53),
        ),
        (
            "jbd_bms",
            AdvertisementRecord::new()
                .with_local_name(b"DP04S007L4S120A")
                .with_service(uuid16(0xff00))
                .with_manufacturer_data(42435, b"'7\xc2\xa5")
                .with_tx_power(-127)
                .with_rssi(-49),
        ),
        (
            "jbd_bms",
            AdvertisementRecord::new()
                .with_local_name(b"SP17S005P17S120A")
                .with_service(uuid16(0xff00))
                .with_manufacturer_data(34114, b"\x1c\x1f\xc2\xa5")
                .with_tx_power(-127)
                .with_rssi(-31),
        ),
        (
            "jbd_bms",
            AdvertisementRecord::new()
                .with_local_name(b"12300DE00013")
                .with_service(uuid16(0xff00))
                .with_manufacturer_data(44580, b"'7\xc2\xa5")
                .with_rssi(-60),
        ),
        (
            "felicity_bms",
            AdvertisementRecord::new()
                .with_local_name(b"F100011002424470238")
                .with_rssi(-56),
        ),
    ]
}
