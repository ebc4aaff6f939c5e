use std::collections::VecDeque;

use lockamp_core::{
    defined::{ADC_SAMPLES_SIZE_S32, FIFO_CAPACITY_S32, FIR_TAPS},
    register::{
        bank_size, control1, control2, Bank, RegisterError, CONTROL1_SIZE, CONTROL2_SIZE,
        FIR_CYCLES_MASK,
    },
    sample::{Sample, ENTRIES_PER_SAMPLE},
};

use super::{stream::Stream, EMULATED_VERSION};

pub(crate) struct Memory {
    control1: Vec<u32>,
    control2: Vec<u32>,
    fir: Vec<u32>,
    fifo: VecDeque<u32>,
    fifo_capacity: usize,
    fifo_dropped: u64,
    adc: Vec<u32>,
    adc_cursor: usize,
    powered: bool,
    stream: Option<Stream>,
}

impl Memory {
    pub fn new(fifo_capacity: usize) -> Self {
        let mut mem = Self {
            control1: Vec::new(),
            control2: Vec::new(),
            fir: Vec::new(),
            fifo: VecDeque::with_capacity(fifo_capacity),
            fifo_capacity,
            fifo_dropped: 0,
            adc: vec![0; ADC_SAMPLES_SIZE_S32],
            adc_cursor: 0,
            powered: true,
            stream: None,
        };
        mem.reset();
        mem
    }

    fn reset(&mut self) {
        self.control1 = vec![0; CONTROL1_SIZE];
        self.control1[control1::VERSION] = EMULATED_VERSION;
        self.control2 = vec![0; CONTROL2_SIZE];
        self.fir = vec![0; FIR_TAPS];
        self.fifo.clear();
        self.adc_cursor = 0;
        self.stream = None;
    }

    fn check(&self, bank: Bank, offset: usize) -> Result<(), RegisterError> {
        if !self.powered {
            return Err(RegisterError::new("device is powered down".to_owned()));
        }
        if offset >= bank_size(bank) {
            return Err(RegisterError::new(format!(
                "offset {} is out of range of {:?}",
                offset, bank
            )));
        }
        Ok(())
    }

    pub fn read(&mut self, bank: Bank, offset: usize) -> Result<u32, RegisterError> {
        self.check(bank, offset)?;
        self.update_stream();
        Ok(match (bank, offset) {
            (Bank::Control1, control1::FIFO_SIZE) => self.fifo.len() as u32,
            (Bank::Control1, control1::FIFO_POP) => self.fifo.pop_front().unwrap_or(0),
            (Bank::Control1, control1::ADC_DUMP) => {
                let v = self.adc[self.adc_cursor];
                self.adc_cursor = (self.adc_cursor + 1) % self.adc.len();
                v
            }
            (Bank::Control1, _) => self.control1[offset],
            (Bank::Control2, _) => self.control2[offset],
            (Bank::Fir, _) => self.fir[offset],
        })
    }

    pub fn write(&mut self, bank: Bank, offset: usize, value: u32) -> Result<(), RegisterError> {
        self.check(bank, offset)?;
        match (bank, offset) {
            (Bank::Control1, control1::VERSION | control1::FIFO_SIZE | control1::FIFO_POP) => {}
            (Bank::Control1, control1::ADC_DUMP) => self.adc_cursor = 0,
            (Bank::Control1, _) => self.control1[offset] = value,
            (Bank::Control2, control2::FIR_CYCLES) => {
                self.control2[offset] = value & FIR_CYCLES_MASK
            }
            (Bank::Control2, _) => self.control2[offset] = value,
            (Bank::Fir, _) => self.fir[offset] = value,
        }
        Ok(())
    }

    pub fn peek(&self, bank: Bank, offset: usize) -> u32 {
        match bank {
            Bank::Control1 => self.control1[offset],
            Bank::Control2 => self.control2[offset],
            Bank::Fir => self.fir[offset],
        }
    }

    pub fn fir(&self) -> Vec<i32> {
        self.fir.iter().map(|&v| v as i32).collect()
    }

    pub fn push_word(&mut self, word: i32) -> bool {
        if self.fifo.len() >= self.fifo_capacity {
            self.fifo_dropped += 1;
            return false;
        }
        self.fifo.push_back(word as u32);
        true
    }

    pub fn push_sample(&mut self, sample: &Sample) -> bool {
        if self.fifo.len() + ENTRIES_PER_SAMPLE > self.fifo_capacity {
            self.fifo_dropped += ENTRIES_PER_SAMPLE as u64;
            return false;
        }
        self.fifo
            .extend(sample.entries().into_iter().map(|v| v as u32));
        true
    }

    pub fn fifo_len(&self) -> usize {
        self.fifo.len()
    }

    pub fn fifo_dropped(&self) -> u64 {
        self.fifo_dropped
    }

    pub fn set_adc(&mut self, samples: &[i32]) {
        self.adc
            .iter_mut()
            .zip(samples.iter().chain(std::iter::repeat(&0)))
            .for_each(|(dst, &src)| *dst = src as u32);
    }

    pub fn hb_filters(&self) -> u32 {
        self.control2[control2::HB_FILTERS]
    }

    pub fn start_stream(&mut self) {
        self.stream = Some(Stream::new(self.hb_filters()));
    }

    pub fn stop_stream(&mut self) {
        self.update_stream();
        self.stream = None;
    }

    pub fn streamed(&self) -> Option<u64> {
        self.stream.as_ref().map(Stream::emitted)
    }

    fn update_stream(&mut self) {
        let Some(mut stream) = self.stream.take() else {
            return;
        };
        stream.emit(self.hb_filters(), |s| {
            self.push_sample(&s);
        });
        self.stream = Some(stream);
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    pub fn power_down(&mut self) {
        self.powered = false;
        self.reset();
    }

    pub fn power_up(&mut self) {
        self.powered = true;
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new(FIFO_CAPACITY_S32)
    }
}
